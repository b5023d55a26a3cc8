//! Decision tree nodes
//!
//! A node starts [`DecisionNode::Invalid`] and is finalized exactly once by
//! the builder, into either a split or a leaf.
//!
//! # Binary layout
//!
//! ```text
//! [type: i32][threshold: f64][feature response][statistics][present: i32][leaf payload]
//! ```
//!
//! All fields are written for every node type. Fields a node does not use
//! are filled with default values (`NaN` for the threshold), so a reader
//! never needs per-type framing.
//!
//! The `present` flag belongs to the node record, not to the payload blob.
//! A leaf may carry no payload, and a payload's own encoding cannot express
//! absence, so the core writes `1` or `0` ahead of the blob and still writes
//! a default payload when absent. Readers of the format must consume this
//! `i32` between the statistics and the payload.

use crate::codec::{read_f64, read_i32, write_f64, write_i32, BinaryCodec};
use crate::errors::{ForestError, Result};
use std::io::{self, Read, Write};

/// Routing rule shared by training and inference: `true` routes to the left child.
#[inline]
pub fn goes_left(response: f64, threshold: f64) -> bool {
    response > threshold
}

/// Node state without its contents
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Split,
    Leaf,
    Invalid,
}

impl NodeKind {
    pub fn tag(self) -> i32 {
        match self {
            Self::Split => 0,
            Self::Leaf => 1,
            Self::Invalid => 2,
        }
    }

    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(Self::Split),
            1 => Some(Self::Leaf),
            2 => Some(Self::Invalid),
            _ => None,
        }
    }
}

/// A slot of a decision tree
#[derive(Debug, Clone)]
pub enum DecisionNode<F, S, L> {
    /// Not finalized; unreachable in a finished tree except below leaves
    Invalid,
    /// Routes points with `response > threshold` left, others right
    Split { response: F, threshold: f64, stats: S },
    /// Terminal node
    Leaf { stats: S, payload: Option<L> },
}

impl<F, S, L> Default for DecisionNode<F, S, L> {
    fn default() -> Self {
        Self::Invalid
    }
}

impl<F, S, L> DecisionNode<F, S, L> {
    /// Finalize as a split node
    pub fn make_split(&mut self, stats: S, response: F, threshold: f64) -> Result<()> {
        self.ensure_invalid()?;
        *self = Self::Split {
            response,
            threshold,
            stats,
        };
        Ok(())
    }

    /// Finalize as a leaf node
    pub fn make_leaf(&mut self, stats: S, payload: Option<L>) -> Result<()> {
        self.ensure_invalid()?;
        *self = Self::Leaf { stats, payload };
        Ok(())
    }

    fn ensure_invalid(&self) -> Result<()> {
        match self {
            Self::Invalid => Ok(()),
            _ => Err(ForestError::InternalInconsistency(format!(
                "node already finalized as {:?}",
                self.kind()
            ))),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Invalid => NodeKind::Invalid,
            Self::Split { .. } => NodeKind::Split,
            Self::Leaf { .. } => NodeKind::Leaf,
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self, Self::Split { .. })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }

    /// Split threshold, `NaN` for leaves and invalid nodes
    pub fn threshold(&self) -> f64 {
        match self {
            Self::Split { threshold, .. } => *threshold,
            _ => f64::NAN,
        }
    }

    pub fn statistics(&self) -> Option<&S> {
        match self {
            Self::Split { stats, .. } | Self::Leaf { stats, .. } => Some(stats),
            Self::Invalid => None,
        }
    }

    pub fn feature_response(&self) -> Option<&F> {
        match self {
            Self::Split { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&L> {
        match self {
            Self::Leaf { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}

impl<F, S, L> BinaryCodec for DecisionNode<F, S, L>
where
    F: BinaryCodec + Default,
    S: BinaryCodec + Default,
    L: BinaryCodec + Default,
{
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_i32(writer, self.kind().tag())?;
        write_f64(writer, self.threshold())?;

        match self.feature_response() {
            Some(response) => response.encode(writer)?,
            None => F::default().encode(writer)?,
        }

        match self.statistics() {
            Some(stats) => stats.encode(writer)?,
            None => S::default().encode(writer)?,
        }

        match self.payload() {
            Some(payload) => {
                write_i32(writer, 1)?;
                payload.encode(writer)?;
            }
            None => {
                write_i32(writer, 0)?;
                L::default().encode(writer)?;
            }
        }

        Ok(())
    }

    fn decode<R: Read>(reader: &mut R) -> io::Result<Self> {
        let tag = read_i32(reader)?;
        let kind = NodeKind::from_tag(tag).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, format!("unknown node type tag {tag}"))
        })?;

        let threshold = read_f64(reader)?;
        let response = F::decode(reader)?;
        let stats = S::decode(reader)?;
        let present = read_i32(reader)? != 0;
        let payload = L::decode(reader)?;

        Ok(match kind {
            NodeKind::Invalid => Self::Invalid,
            NodeKind::Split => Self::Split {
                response,
                threshold,
                stats,
            },
            NodeKind::Leaf => Self::Leaf {
                stats,
                payload: present.then_some(payload),
            },
        })
    }
}
