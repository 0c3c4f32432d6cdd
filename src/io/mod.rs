// Purpose - external interfaces, audio file formats

pub mod wav;

pub use wav::write_wav;
