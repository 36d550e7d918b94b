//! RTF building blocks: colors, styles, text escaping, table layout and images.

pub mod color;
pub mod encode;
pub mod image;
pub mod style;
pub mod table;

pub use self::color::{hex_to_rgb, ColorTable, Rgb, EXISTING_COLORS};
pub use self::encode::{encode_code_point, encode_plain, encode_text, unicode_escape, NormalizeMode};
pub use self::image::{BlipFormat, EmbeddedImage, ImageEmbedder, DEFAULT_IMAGE_SIZE, PIXELS_TO_TWIPS};
pub use self::style::{parse_declarations, resolve_class_styles};
pub use self::table::{ColumnStats, WidthMode, MARGIN_WIDTH, MULTIPLY_WIDTH};
