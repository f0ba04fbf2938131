/// Why an allocation request could not be served.
///
/// The pointer-returning façade collapses both kinds into a null pointer;
/// the `try_*` methods hand them out as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
  #[error("invalid allocation size")]
  InvalidSize,

  #[error("out of memory")]
  OutOfMemory,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
  #[error("segregated strategy needs at least one size class")]
  NoSizeClasses,

  #[error("the smallest size class must start at one word or more")]
  ZeroBoundary,

  #[error("size class boundaries must be strictly increasing: {prev} then {next}")]
  UnorderedBoundaries { prev: usize, next: usize },
}

pub type Result<T> = std::result::Result<T, AllocError>;
