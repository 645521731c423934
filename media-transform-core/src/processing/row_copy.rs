use crate::models::error::TransformError;

/// Copy `rows` rows of `row_bytes` each between two pitched buffers.
///
/// When both pitches equal the packed row width the frame is copied as one
/// block; otherwise row by row, leaving destination padding untouched.
pub fn copy_rows(
    dst: &mut [u8],
    dst_pitch: usize,
    src: &[u8],
    src_pitch: usize,
    row_bytes: usize,
    rows: usize,
) -> Result<(), TransformError> {
    if rows == 0 || row_bytes == 0 {
        return Ok(());
    }
    if dst_pitch < row_bytes || src_pitch < row_bytes {
        return Err(TransformError::InvalidArgument(format!(
            "pitch smaller than row width: dst {} src {} row {}",
            dst_pitch, src_pitch, row_bytes
        )));
    }

    let src_needed = span(src_pitch, row_bytes, rows)?;
    let dst_needed = span(dst_pitch, row_bytes, rows)?;
    if src.len() < src_needed {
        return Err(TransformError::InvalidArgument(format!(
            "source buffer too small: {} < {}",
            src.len(),
            src_needed
        )));
    }
    if dst.len() < dst_needed {
        return Err(TransformError::InvalidArgument(format!(
            "destination buffer too small: {} < {}",
            dst.len(),
            dst_needed
        )));
    }

    if dst_pitch == row_bytes && src_pitch == row_bytes {
        let total = row_bytes * rows;
        dst[..total].copy_from_slice(&src[..total]);
        return Ok(());
    }

    for row in 0..rows {
        let s = row * src_pitch;
        let d = row * dst_pitch;
        dst[d..d + row_bytes].copy_from_slice(&src[s..s + row_bytes]);
    }
    Ok(())
}

/// Bytes spanned by `rows` rows; the last row needs no trailing padding.
///
/// Every offset the copy touches lies below this span, so once it is known
/// to fit, the per-row arithmetic cannot overflow.
fn span(pitch: usize, row_bytes: usize, rows: usize) -> Result<usize, TransformError> {
    pitch
        .checked_mul(rows - 1)
        .and_then(|n| n.checked_add(row_bytes))
        .ok_or_else(|| {
            TransformError::InvalidArgument(format!("pitch {} over {} rows overflows the address space", pitch, rows))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_copy() {
        let src = [1u8, 2, 3, 4, 5, 6];
        let mut dst = [0u8; 6];

        copy_rows(&mut dst, 3, &src, 3, 3, 2).unwrap();

        assert_eq!(dst, src);
    }

    #[test]
    fn wider_destination_pitch_keeps_padding() {
        let src = [1u8, 2, 3, 4, 5, 6];
        let mut dst = [0xEEu8; 10];

        copy_rows(&mut dst, 5, &src, 3, 3, 2).unwrap();

        assert_eq!(dst, [1, 2, 3, 0xEE, 0xEE, 4, 5, 6, 0xEE, 0xEE]);
    }

    #[test]
    fn padded_source_into_packed_destination() {
        let src = [1u8, 2, 0, 0, 3, 4];
        let mut dst = [0u8; 4];

        copy_rows(&mut dst, 2, &src, 4, 2, 2).unwrap();

        assert_eq!(dst, [1, 2, 3, 4]);
    }

    #[test]
    fn last_row_needs_no_padding() {
        let src = [1u8, 2, 3, 4];
        let mut dst = [0u8; 6]; // pitch 4, 2 rows of 2: 4 + 2

        copy_rows(&mut dst, 4, &src, 2, 2, 2).unwrap();

        assert_eq!(dst, [1, 2, 0, 0, 3, 4]);
    }

    #[test]
    fn rejects_short_source() {
        let src = [1u8, 2, 3];
        let mut dst = [0u8; 8];

        let err = copy_rows(&mut dst, 4, &src, 2, 2, 2).unwrap_err();
        assert!(matches!(err, TransformError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_pitch_below_row_width() {
        let src = [0u8; 8];
        let mut dst = [0u8; 8];

        assert!(copy_rows(&mut dst, 2, &src, 4, 4, 2).is_err());
    }

    #[test]
    fn huge_pitch_is_rejected_not_overflowed() {
        let src = [0u8; 16];
        let mut dst = [0u8; 16];

        let err = copy_rows(&mut dst, 8, &src, usize::MAX, 8, 2).unwrap_err();
        assert!(matches!(err, TransformError::InvalidArgument(_)));

        let err = copy_rows(&mut dst, usize::MAX / 2 + 1, &src, 8, 8, 3).unwrap_err();
        assert!(matches!(err, TransformError::InvalidArgument(_)));
    }

    #[test]
    fn zero_rows_is_noop() {
        let mut dst = [7u8; 2];
        copy_rows(&mut dst, 1, &[], 1, 1, 0).unwrap();
        assert_eq!(dst, [7, 7]);
    }
}
