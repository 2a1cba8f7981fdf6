/// A single captured frame: contiguous RGB bytes in row-major order.
///
/// Pixel format conversion happens at the capture and encode boundaries;
/// everything in between treats the data as packed RGB24.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Position of the frame in the capture stream, starting at 0.
    pub fn index(&self) -> usize {
        self.index
    }

    /// RGBA8 copy with opaque alpha, for toolkits that upload four channels.
    pub fn to_rgba(&self) -> Vec<u8> {
        let pixels = self.width as usize * self.height as usize;
        let mut rgba = Vec::with_capacity(pixels * 4);
        match self.channels {
            4 => rgba.extend_from_slice(&self.data),
            1 => {
                for &v in &self.data {
                    rgba.extend_from_slice(&[v, v, v, 255]);
                }
            }
            _ => {
                for px in self.data.chunks_exact(self.channels as usize) {
                    rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
            }
        }
        rgba
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_data_mut_allows_modification() {
        let mut frame = Frame::new(vec![0u8; 6], 2, 1, 3, 0);
        frame.data_mut()[0] = 255;
        assert_eq!(frame.data()[0], 255);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 3, 0);
    }

    #[test]
    fn test_to_rgba_appends_opaque_alpha() {
        let frame = Frame::new(vec![10, 20, 30, 40, 50, 60], 2, 1, 3, 0);
        assert_eq!(frame.to_rgba(), vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn test_to_rgba_expands_gray() {
        let frame = Frame::new(vec![7, 9], 2, 1, 1, 0);
        assert_eq!(frame.to_rgba(), vec![7, 7, 7, 255, 9, 9, 9, 255]);
    }

    #[test]
    fn test_to_rgba_passes_through_four_channels() {
        let data = vec![1, 2, 3, 4];
        let frame = Frame::new(data.clone(), 1, 1, 4, 0);
        assert_eq!(frame.to_rgba(), data);
    }
}
