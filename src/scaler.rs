use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed mapping from destination pixels to source pixels
pub struct ScaleLut {
    src_x: Vec<usize>,
    // Row start offsets into the source buffer
    src_row: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            src_x: Vec::new(),
            src_row: Vec::new(),
        }
    }
}

pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleLut {
    if src_w == 0 || src_h == 0 {
        return ScaleLut::empty();
    }

    // Sample at destination pixel centers
    let pick = |d: usize, dst: usize, src: usize| {
        let s = ((d as f32 + 0.5) * src as f32 / dst as f32) as usize;
        s.min(src - 1)
    };

    ScaleLut {
        src_x: (0..dst_w).map(|x| pick(x, dst_w, src_w)).collect(),
        src_row: (0..dst_h).map(|y| pick(y, dst_h, src_h) * src_w).collect(),
    }
}

/// Parallel nearest-neighbour stretch. Rows are processed in parallel;
/// destination rows outside the table are left untouched.
pub fn blit_nearest_stretch(dst: &mut [u32], dw: usize, src: &[u32], lut: &ScaleLut) {
    if dw == 0 || src.is_empty() {
        return;
    }
    dst.par_chunks_mut(dw).enumerate().for_each(|(y, dst_row)| {
        let Some(&row) = lut.src_row.get(y) else {
            return;
        };
        for (out, &sx) in dst_row.iter_mut().zip(&lut.src_x) {
            *out = src[row + sx];
        }
    });
}
