pub mod keyboard;
pub mod matrix;
pub mod sheet;
pub mod transpose;

pub use keyboard::{PitchTable, KEY_COUNT, KEY_NAMES, REST};
pub use matrix::{load_or_convert, to_matrix, Matrix, MatrixRow};
pub use sheet::{parse, Sheet, SheetEvent, SheetHeader};
pub use transpose::{shift_degrees, to_degrees, transpose, Note, Pitch};
