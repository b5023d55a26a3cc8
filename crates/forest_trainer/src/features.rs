//! Axis-aligned feature response for 2D points

use crate::points::Planar;
use arbor_forest_core::codec::{read_len, write_len};
use arbor_forest_core::{BinaryCodec, FeatureResponse};
use rand::Rng;
use std::io::{self, Read, Write};

/// Responds with one coordinate of the point, chosen uniformly at sampling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisAligned2D {
    axis: usize,
}

impl AxisAligned2D {
    pub const DIMENSIONS: usize = 2;

    pub fn new(axis: usize) -> Option<Self> {
        (axis < Self::DIMENSIONS).then_some(Self { axis })
    }

    pub fn axis(&self) -> usize {
        self.axis
    }
}

impl<P: Planar> FeatureResponse<P> for AxisAligned2D {
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            axis: rng.gen_range(0..Self::DIMENSIONS),
        }
    }

    fn response(&self, point: &P) -> f64 {
        point.coord(self.axis)
    }
}

impl BinaryCodec for AxisAligned2D {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_len(writer, self.axis)
    }

    fn decode<R: Read>(reader: &mut R) -> io::Result<Self> {
        let axis = read_len(reader)?;
        Self::new(axis).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, format!("invalid axis {axis}"))
        })
    }
}
