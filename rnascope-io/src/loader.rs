//! TIFF loading and the 3-channel stack shape contract.
//!
//! Montage files arrive in a handful of layouts: one RGB page, three
//! grayscale pages (one per channel), or `3 * z` grayscale pages written
//! channel-fastest (the `(z, c, y, x)` hyperstack convention). All of them
//! reduce to a `(3, H, W)` [`ChannelStack`], with an optional depth axis
//! collapsed by maximum-intensity projection.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::{ArrayD, Axis, Ix3, IxDyn};
use rnascope_core::{ChannelStack, CHANNEL_COUNT};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::ColorType;

use crate::{Error, Result};

/// Loads a montage TIFF and reduces it to a 3-channel stack.
///
/// `already_projected` declares that the file carries no depth axis; a file
/// that still has one is then rejected as a caller/data mismatch instead of
/// being silently projected.
///
/// # Errors
/// Returns a shape-contract violation for any layout that does not reduce
/// to a 3-channel 2D stack, and I/O or TIFF errors from decoding.
pub fn load_stack<P: AsRef<Path>>(path: P, already_projected: bool) -> Result<ChannelStack> {
    let file = File::open(path.as_ref())?;
    let mut decoder = Decoder::new(BufReader::new(file))?;

    let mut pages: Vec<Page> = Vec::new();
    loop {
        pages.push(read_page(&mut decoder)?);
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }

    let array = pages_to_array(pages)?;
    stack_from_array(array, already_projected)
}

/// Applies the stack shape contract to an already-decoded array.
///
/// A 4-D array is interpreted as `(depth, channel, height, width)` and
/// max-projected over depth (rejected when `already_projected` is set).
/// The result must be 3-D with a channel axis of length 3 first or last;
/// a trailing channel axis is moved to the front.
///
/// # Errors
/// Returns a shape-contract violation for any other layout.
pub fn stack_from_array(array: ArrayD<f64>, already_projected: bool) -> Result<ChannelStack> {
    let array = if array.ndim() == 4 {
        if already_projected {
            return Err(Error::shape_mismatch(
                "image flagged as already max-projected but still has a depth axis",
            ));
        }
        array.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &v| acc.max(v))
    } else {
        array
    };

    if array.ndim() != 3 {
        return Err(Error::shape_mismatch(format!(
            "expected 3-channel image, got {} dimensions",
            array.ndim()
        )));
    }

    let shape = array.shape();
    let channel_first = if shape[0] == CHANNEL_COUNT {
        array
    } else if shape[2] == CHANNEL_COUNT {
        // (H, W, C) -> (C, H, W)
        let transposed = array.permuted_axes(IxDyn(&[2, 0, 1]));
        transposed.as_standard_layout().to_owned()
    } else {
        return Err(Error::shape_mismatch("expected 3-channel image"));
    };

    let stack = channel_first
        .into_dimensionality::<Ix3>()
        .map_err(|e| Error::shape_mismatch(e.to_string()))?;
    Ok(ChannelStack::new(stack)?)
}

struct Page {
    width: usize,
    height: usize,
    samples: usize,
    data: Vec<f64>,
}

fn read_page<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Result<Page> {
    let (width, height) = decoder.dimensions()?;
    let samples = match decoder.colortype()? {
        ColorType::Gray(_) => 1,
        ColorType::RGB(_) => 3,
        other => {
            return Err(Error::InvalidFormat(format!(
                "unsupported color type: {other:?}"
            )))
        }
    };
    let data = samples_to_f64(decoder.read_image()?)?;
    let (width, height) = (width as usize, height as usize);
    if data.len() != width * height * samples {
        return Err(Error::InvalidFormat(format!(
            "page sample count {} does not match {}x{}x{}",
            data.len(),
            height,
            width,
            samples
        )));
    }
    Ok(Page {
        width,
        height,
        samples,
        data,
    })
}

#[allow(clippy::cast_precision_loss)]
fn samples_to_f64(result: DecodingResult) -> Result<Vec<f64>> {
    Ok(match result {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
        #[allow(unreachable_patterns)]
        _ => return Err(Error::InvalidFormat("unsupported sample format".into())),
    })
}

/// Assembles decoded pages into the N-dimensional array the shape contract
/// expects.
fn pages_to_array(pages: Vec<Page>) -> Result<ArrayD<f64>> {
    let Some(first) = pages.first() else {
        return Err(Error::InvalidFormat("TIFF contains no pages".into()));
    };
    let (height, width) = (first.height, first.width);

    if pages
        .iter()
        .any(|p| p.height != height || p.width != width || p.samples != first.samples)
    {
        return Err(Error::shape_mismatch(
            "pages differ in dimensions or sample layout",
        ));
    }

    if first.samples == 3 {
        if pages.len() != 1 {
            return Err(Error::shape_mismatch(
                "multi-page RGB layout is not supported",
            ));
        }
        let page = pages.into_iter().next().unwrap_or_else(|| unreachable!());
        let array = ArrayD::from_shape_vec(IxDyn(&[height, width, 3]), page.data)
            .map_err(|e| Error::shape_mismatch(e.to_string()))?;
        return Ok(array);
    }

    let n = pages.len();
    let data: Vec<f64> = pages.into_iter().flat_map(|p| p.data).collect();

    if n == CHANNEL_COUNT {
        ArrayD::from_shape_vec(IxDyn(&[CHANNEL_COUNT, height, width]), data)
    } else if n % CHANNEL_COUNT == 0 && n > 0 {
        // channel-fastest page order: z blocks of (c, y, x)
        ArrayD::from_shape_vec(IxDyn(&[n / CHANNEL_COUNT, CHANNEL_COUNT, height, width]), data)
    } else {
        return Err(Error::shape_mismatch(format!(
            "{n} grayscale pages cannot form a 3-channel stack"
        )));
    }
    .map_err(|e| Error::shape_mismatch(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array, Array4};
    use std::io::{Cursor, Seek, SeekFrom, Write};
    use tempfile::NamedTempFile;
    use tiff::encoder::{colortype, TiffEncoder};

    fn dyn_from_4d(array: Array4<f64>) -> ArrayD<f64> {
        array.into_dyn()
    }

    #[test]
    fn test_4d_array_is_max_projected() {
        // (depth=3, channel=3, 50, 60) filled so depth plane d carries value d.
        let array = Array4::from_shape_fn((3, 3, 50, 60), |(d, _, _, _)| {
            #[allow(clippy::cast_precision_loss)]
            {
                d as f64
            }
        });
        let stack = stack_from_array(dyn_from_4d(array), false).unwrap();
        assert_eq!(stack.height(), 50);
        assert_eq!(stack.width(), 60);
        // Maximum across depth is the deepest plane's value.
        assert_relative_eq!(stack.channel(0)[[0, 0]], 2.0);
        assert_relative_eq!(stack.channel(2)[[49, 59]], 2.0);
    }

    #[test]
    fn test_4d_projection_takes_per_position_maximum() {
        let mut array = Array4::from_elem((2, 3, 4, 4), 1.0);
        array[[0, 1, 2, 2]] = 9.0;
        array[[1, 1, 2, 2]] = 5.0;
        let stack = stack_from_array(dyn_from_4d(array), false).unwrap();
        assert_relative_eq!(stack.channel(1)[[2, 2]], 9.0);
        assert_relative_eq!(stack.channel(1)[[0, 0]], 1.0);
    }

    #[test]
    fn test_4d_with_already_projected_flag_is_rejected() {
        let array = Array4::from_elem((3, 3, 50, 60), 0.0);
        let err = stack_from_array(dyn_from_4d(array), true).unwrap_err();
        assert!(matches!(
            err,
            Error::Core(rnascope_core::Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_channel_last_axis_is_moved_to_front() {
        let array = Array::from_shape_fn((50, 60, 3), |(row, col, chan)| {
            #[allow(clippy::cast_precision_loss)]
            {
                (chan * 10_000 + row * 100 + col) as f64
            }
        });
        let stack = stack_from_array(array.into_dyn(), false).unwrap();
        assert_eq!(stack.height(), 50);
        assert_eq!(stack.width(), 60);
        for &(chan, row, col) in &[(0, 0, 0), (1, 10, 20), (2, 49, 59)] {
            #[allow(clippy::cast_precision_loss)]
            let expected = (chan * 10_000 + row * 100 + col) as f64;
            assert_relative_eq!(stack.channel(chan)[[row, col]], expected);
        }
    }

    #[test]
    fn test_channel_first_axis_is_used_as_is() {
        let array = Array::from_elem((3, 8, 9), 4.0);
        let stack = stack_from_array(array.into_dyn(), true).unwrap();
        assert_eq!(stack.height(), 8);
        assert_eq!(stack.width(), 9);
    }

    #[test]
    fn test_other_shapes_are_rejected() {
        for shape in [vec![4usize, 8, 9], vec![8, 9], vec![2, 3, 8, 9, 1]] {
            let array = ArrayD::from_elem(IxDyn(&shape), 0.0);
            let err = stack_from_array(array, false).unwrap_err();
            assert!(
                matches!(err, Error::Core(rnascope_core::Error::ShapeMismatch(_))),
                "shape {shape:?} not rejected"
            );
        }
    }

    fn write_gray16_pages(pages: &[Vec<u16>], width: u32, height: u32) -> NamedTempFile {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buffer).unwrap();
            for page in pages {
                encoder
                    .write_image::<colortype::Gray16>(width, height, page)
                    .unwrap();
            }
        }
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(buffer.get_ref()).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        file
    }

    #[test]
    fn test_load_three_page_grayscale_tiff() {
        let (width, height) = (5u32, 4u32);
        let pages: Vec<Vec<u16>> = (0..3)
            .map(|chan| (0..20).map(|i| chan * 1000 + i).collect())
            .collect();
        let file = write_gray16_pages(&pages, width, height);

        let stack = load_stack(file.path(), true).unwrap();
        assert_eq!(stack.height(), 4);
        assert_eq!(stack.width(), 5);
        assert_relative_eq!(stack.channel(0)[[0, 0]], 0.0);
        assert_relative_eq!(stack.channel(1)[[0, 0]], 1000.0);
        assert_relative_eq!(stack.channel(2)[[3, 4]], 2019.0);
    }

    #[test]
    fn test_load_z_stack_tiff_is_projected() {
        // Two depth planes of three channels; second plane brighter.
        let (width, height) = (3u32, 2u32);
        let mut pages: Vec<Vec<u16>> = Vec::new();
        for z in 0..2u16 {
            for chan in 0..3u16 {
                pages.push((0..6).map(|i| z * 100 + chan * 10 + i).collect());
            }
        }
        let file = write_gray16_pages(&pages, width, height);

        let stack = load_stack(file.path(), false).unwrap();
        // Max projection keeps the z=1 values.
        assert_relative_eq!(stack.channel(0)[[0, 0]], 100.0);
        assert_relative_eq!(stack.channel(2)[[1, 2]], 125.0);
    }

    #[test]
    fn test_load_z_stack_with_projected_flag_fails() {
        let pages: Vec<Vec<u16>> = (0..6).map(|_| vec![0u16; 6]).collect();
        let file = write_gray16_pages(&pages, 3, 2);
        let err = load_stack(file.path(), true).unwrap_err();
        assert!(matches!(
            err,
            Error::Core(rnascope_core::Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_load_rgb_page_moves_channel_axis() {
        let (width, height) = (4u32, 3u32);
        let mut data = Vec::with_capacity(36);
        for i in 0..12u16 {
            data.extend_from_slice(&[i, 100 + i, 200 + i]);
        }
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buffer).unwrap();
            encoder
                .write_image::<colortype::RGB16>(width, height, &data)
                .unwrap();
        }
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(buffer.get_ref()).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let stack = load_stack(file.path(), true).unwrap();
        assert_eq!(stack.height(), 3);
        assert_eq!(stack.width(), 4);
        assert_relative_eq!(stack.channel(0)[[0, 0]], 0.0);
        assert_relative_eq!(stack.channel(1)[[0, 0]], 100.0);
        assert_relative_eq!(stack.channel(2)[[2, 3]], 211.0);
    }

    #[test]
    fn test_load_wrong_page_count_fails() {
        let pages: Vec<Vec<u16>> = (0..4).map(|_| vec![0u16; 6]).collect();
        let file = write_gray16_pages(&pages, 3, 2);
        let err = load_stack(file.path(), false).unwrap_err();
        assert!(matches!(
            err,
            Error::Core(rnascope_core::Error::ShapeMismatch(_))
        ));
    }
}
