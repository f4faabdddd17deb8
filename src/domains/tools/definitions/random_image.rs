//! Random image tool definition.
//!
//! Generates a square raster of uniformly random opaque pixels, encodes it as
//! JPEG and returns it as base64 image content.

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use rand::Rng;
use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use super::common::error_result;
use crate::domains::tools::{ToolError, ToolRegistry};

/// Width and height of the generated image, in pixels.
pub const IMAGE_SIZE: u32 = 128;

/// MIME type of the returned image content.
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

// ============================================================================
// Tool Parameters
// ============================================================================

/// The random image tool takes no parameters.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct RandomImageParams {}

// ============================================================================
// Tool Definition
// ============================================================================

/// Random image tool - returns a random 128x128 JPEG as base64.
pub struct RandomImageTool;

impl RandomImageTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "randomBase64Image";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Generates a random 128x128 JPEG image and returns it as base64-encoded image content.";

    /// Execute the tool logic.
    #[instrument(skip_all)]
    pub fn execute(_params: &RandomImageParams) -> CallToolResult {
        info!("Random image tool called");

        let raster = generate_raster(&mut rand::thread_rng());
        match encode_jpeg(raster) {
            Ok(bytes) => {
                info!("Encoded {} byte JPEG", bytes.len());
                let data = STANDARD.encode(&bytes);
                CallToolResult::success(vec![Content::image(data, IMAGE_MIME_TYPE)])
            }
            Err(e) => error_result(&format!("Failed to encode image: {}", e)),
        }
    }

    /// Register this tool with the registry.
    pub fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
        registry.register_typed::<RandomImageParams, _>(
            Self::NAME,
            Self::DESCRIPTION,
            Self::execute,
        )
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Fill an `IMAGE_SIZE` square with random RGB channels and opaque alpha.
pub fn generate_raster<R: Rng + ?Sized>(rng: &mut R) -> RgbaImage {
    RgbaImage::from_fn(IMAGE_SIZE, IMAGE_SIZE, |_, _| {
        Rgba([rng.r#gen(), rng.r#gen(), rng.r#gen(), u8::MAX])
    })
}

/// Encode a raster as JPEG.
///
/// JPEG has no alpha channel. The opaque alpha is dropped before encoding
/// and decoders report it as 255.
pub fn encode_jpeg(raster: RgbaImage) -> image::ImageResult<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(raster).to_rgb8();
    let mut bytes = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)?;
    Ok(bytes)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use rmcp::model::RawContent;

    #[test]
    fn test_generate_raster_is_opaque() {
        let raster = generate_raster(&mut StdRng::seed_from_u64(7));
        assert_eq!(raster.dimensions(), (IMAGE_SIZE, IMAGE_SIZE));
        assert!(raster.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn test_generate_raster_varies() {
        let raster = generate_raster(&mut StdRng::seed_from_u64(42));
        let first = *raster.get_pixel(0, 0);
        assert!(raster.pixels().any(|p| *p != first));
    }

    #[test]
    fn test_execute_returns_jpeg() {
        let result = RandomImageTool::execute(&RandomImageParams::default());
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.content.len(), 1);

        let content = match &result.content[0].raw {
            RawContent::Image(image) => image,
            _ => panic!("Expected image content"),
        };
        assert_eq!(content.mime_type, IMAGE_MIME_TYPE);
        assert!(!content.data.starts_with("data:"));

        let bytes = STANDARD.decode(&content.data).unwrap();
        // SOI marker followed by another marker.
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded.dimensions(), (IMAGE_SIZE, IMAGE_SIZE));
        assert!(decoded.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn test_invocations_differ() {
        let data = |result: CallToolResult| match &result.content[0].raw {
            RawContent::Image(image) => image.data.clone(),
            _ => panic!("Expected image content"),
        };
        let first = data(RandomImageTool::execute(&RandomImageParams::default()));
        let second = data(RandomImageTool::execute(&RandomImageParams::default()));
        assert_ne!(first, second);
    }
}
