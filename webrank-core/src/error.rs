//! Error types for the webrank core library.
//!
//! Structural graph edits and configuration updates report rejection through
//! `bool`/`Option` returns. The enums here cover the paths that can fail for
//! reasons a caller must inspect: page construction, topology generation,
//! simulation setup, snapshots and text ingestion.

use std::{fmt, io};

use thiserror::Error;

use crate::builder::ExecutionStrategy;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Which side of zero a rejected rank fell on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RankSign {
    /// The rank was exactly `0.0`.
    Zero,
    /// The rank was below zero.
    Negative,
}

impl RankSign {
    /// Classifies a non-positive rank, returning `None` for positive or NaN input.
    #[must_use]
    pub fn classify(rank: f64) -> Option<Self> {
        if rank == 0.0 {
            Some(Self::Zero)
        } else if rank < 0.0 {
            Some(Self::Negative)
        } else {
            None
        }
    }
}

impl fmt::Display for RankSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => f.write_str("zero"),
            Self::Negative => f.write_str("negative"),
        }
    }
}

/// An error produced when constructing a [`crate::Page`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PageError {
    /// The URL was empty.
    #[error("page url must not be empty")]
    EmptyUrl,
    /// The initial rank was zero or negative.
    #[error("page `{url}` has {sign} initial rank {rank}")]
    NonPositiveRank {
        /// URL of the rejected page.
        url: String,
        /// The rejected rank.
        rank: f64,
        /// Whether the rank was zero or negative.
        sign: RankSign,
    },
    /// The initial rank was NaN or infinite.
    #[error("page `{url}` has a non-finite initial rank")]
    NonFiniteRank {
        /// URL of the rejected page.
        url: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`PageError`] variants.
    enum PageErrorCode for PageError {
        /// The URL was empty.
        EmptyUrl => EmptyUrl => "PAGE_EMPTY_URL",
        /// The initial rank was zero or negative.
        NonPositiveRank => NonPositiveRank { .. } => "PAGE_NON_POSITIVE_RANK",
        /// The initial rank was NaN or infinite.
        NonFiniteRank => NonFiniteRank { .. } => "PAGE_NON_FINITE_RANK",
    }
}

impl PageError {
    /// Returns the sign of the rejected rank for [`PageError::NonPositiveRank`].
    #[must_use]
    pub const fn rank_sign(&self) -> Option<RankSign> {
        match self {
            Self::NonPositiveRank { sign, .. } => Some(*sign),
            _ => None,
        }
    }
}

/// An error produced while generating a random link topology.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TopologyError {
    /// The graph contained no pages.
    #[error("cannot generate links for an empty graph")]
    EmptyGraph,
    /// The graph holds a single page, which has no valid link target.
    #[error("graph has {pages} page(s); at least 2 are required to create links")]
    TooFewPages {
        /// Number of pages in the graph.
        pages: usize,
    },
    /// Out-degree bounds were inconsistent.
    #[error("invalid topology parameters: {reason}")]
    InvalidParameters {
        /// Explanation of the rejected parameters.
        reason: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`TopologyError`] variants.
    enum TopologyErrorCode for TopologyError {
        /// The graph contained no pages.
        EmptyGraph => EmptyGraph => "TOPOLOGY_EMPTY_GRAPH",
        /// The graph holds a single page.
        TooFewPages => TooFewPages { .. } => "TOPOLOGY_TOO_FEW_PAGES",
        /// Out-degree bounds were inconsistent.
        InvalidParameters => InvalidParameters { .. } => "TOPOLOGY_INVALID_PARAMETERS",
    }
}

/// An error produced while configuring a [`crate::Simulation`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SimulationError {
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
}

define_error_codes! {
    /// Stable codes describing [`SimulationError`] variants.
    enum SimulationErrorCode for SimulationError {
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "SIMULATION_BACKEND_UNAVAILABLE",
    }
}

/// An error produced while saving or loading a graph snapshot.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Reading or writing the underlying stream failed.
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] io::Error),
    /// The graph could not be encoded.
    #[error("failed to encode snapshot: {source}")]
    Encode {
        /// Underlying codec failure.
        #[source]
        source: bincode::Error,
    },
    /// The snapshot body could not be decoded.
    #[error("failed to decode snapshot: {source}")]
    Decode {
        /// Underlying codec failure.
        #[source]
        source: bincode::Error,
    },
    /// The stream does not start with the snapshot magic bytes.
    #[error("stream is not a webrank snapshot")]
    BadMagic,
    /// The snapshot was written by an incompatible format version.
    #[error("snapshot format version {found} is not supported (expected {expected})")]
    UnsupportedVersion {
        /// Version recorded in the snapshot header.
        found: u32,
        /// Version this build reads and writes.
        expected: u32,
    },
    /// The decoded data violates a graph invariant.
    #[error("snapshot is corrupt: {reason}")]
    Corrupt {
        /// Description of the violated invariant.
        reason: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`SnapshotError`] variants.
    enum SnapshotErrorCode for SnapshotError {
        /// Reading or writing the underlying stream failed.
        Io => Io { .. } => "SNAPSHOT_IO",
        /// The graph could not be encoded.
        Encode => Encode { .. } => "SNAPSHOT_ENCODE",
        /// The snapshot body could not be decoded.
        Decode => Decode { .. } => "SNAPSHOT_DECODE",
        /// The stream does not start with the snapshot magic bytes.
        BadMagic => BadMagic => "SNAPSHOT_BAD_MAGIC",
        /// The snapshot was written by an incompatible format version.
        UnsupportedVersion => UnsupportedVersion { .. } => "SNAPSHOT_UNSUPPORTED_VERSION",
        /// The decoded data violates a graph invariant.
        Corrupt => Corrupt { .. } => "SNAPSHOT_CORRUPT",
    }
}

/// An error produced while ingesting page URLs from text.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading the source failed.
    #[error("failed to read page list: {0}")]
    Io(#[from] io::Error),
    /// The source contained no URL tokens.
    #[error("page list contains no urls")]
    EmptyInput,
}

define_error_codes! {
    /// Stable codes describing [`IngestError`] variants.
    enum IngestErrorCode for IngestError {
        /// Reading the source failed.
        Io => Io { .. } => "INGEST_IO",
        /// The source contained no URL tokens.
        EmptyInput => EmptyInput => "INGEST_EMPTY_INPUT",
    }
}
