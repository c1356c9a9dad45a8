#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to allocate {size} bytes aligned to a {align}-byte boundary.")]
    OutOfMemory { size: usize, align: usize },

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
