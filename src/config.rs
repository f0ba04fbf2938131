use crate::{error::ConfigError, fit::Fit};

/// Size class lower bounds in words, the last class being open-ended.
pub const DEFAULT_BOUNDARIES: [usize; 5] = [1, 16, 32, 64, 128];

/// Which structure tracks free space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
  /// One list of every block, in address order.
  Implicit(Fit),
  /// One list holding only free blocks, most recently freed first.
  Explicit(Fit),
  /// One best-fit list per size class.
  Segregated(SegregatedConfig),
}

impl Default for Strategy {
  fn default() -> Self {
    Self::Explicit(Fit::Best)
  }
}

/// What each size class bucket holds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BucketKind {
  /// Every block of the class, used or free.
  #[default]
  Implicit,
  /// Free blocks of the class only.
  Explicit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegregatedConfig {
  /// Lower bound of each class, in words. Strictly increasing, starting at
  /// one word or more.
  pub boundaries: Vec<usize>,

  pub bucket: BucketKind,

  /// Search larger classes when the request's own class has no fit.
  /// Default: false, a miss in the own class grows the heap.
  pub overflow: bool,
}

impl Default for SegregatedConfig {
  fn default() -> Self {
    Self {
      boundaries: DEFAULT_BOUNDARIES.to_vec(),
      bucket: BucketKind::default(),
      overflow: false,
    }
  }
}

/// When released blocks merge with their physical neighbours.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Coalescing {
  /// Never.
  Disabled,
  /// With free successors only.
  Forward,
  /// With free successors, then into a free predecessor.
  #[default]
  Bidirectional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatorConfig {
  pub strategy: Strategy,

  /// Carve oversized free blocks down to the request. Default: true.
  pub split: bool,

  pub coalescing: Coalescing,
}

impl Default for AllocatorConfig {
  fn default() -> Self {
    Self {
      strategy: Strategy::default(),
      split: true,
      coalescing: Coalescing::default(),
    }
  }
}

impl AllocatorConfig {
  pub fn implicit(fit: Fit) -> Self {
    Self {
      strategy: Strategy::Implicit(fit),
      ..Self::default()
    }
  }

  pub fn explicit(fit: Fit) -> Self {
    Self {
      strategy: Strategy::Explicit(fit),
      ..Self::default()
    }
  }

  pub fn segregated(segregated: SegregatedConfig) -> Self {
    Self {
      strategy: Strategy::Segregated(segregated),
      ..Self::default()
    }
  }

  pub fn with_split(
    mut self,
    split: bool,
  ) -> Self {
    self.split = split;
    self
  }

  pub fn with_coalescing(
    mut self,
    coalescing: Coalescing,
  ) -> Self {
    self.coalescing = coalescing;
    self
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    let Strategy::Segregated(segregated) = &self.strategy else {
      return Ok(());
    };

    let boundaries = &segregated.boundaries;

    match boundaries.first() {
      None => return Err(ConfigError::NoSizeClasses),
      Some(&0) => return Err(ConfigError::ZeroBoundary),
      Some(_) => {},
    }

    for pair in boundaries.windows(2) {
      if pair[0] >= pair[1] {
        return Err(ConfigError::UnorderedBoundaries {
          prev: pair[0],
          next: pair[1],
        });
      }
    }

    Ok(())
  }
}
