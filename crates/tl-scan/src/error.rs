use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("could not start scan worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

pub type ScanResult<T> = Result<T, ScanError>;
