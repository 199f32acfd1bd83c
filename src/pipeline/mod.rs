//! Pipeline stages shared by the classifier and both extractors.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ orient ──▶ encode ──▶ (vision model) ──▶ reply
//! (path)    (pdfium /   (portrait   (base64             (JSON → record)
//!            EXIF)       → landscape) PNG)
//! ```
//!
//! 1. [`input`]     — extension check and readability of the source path
//! 2. [`render`]    — first PDF page via pdfium, or raster decode with EXIF
//!    orientation applied; blocking
//! 3. [`orient`]    — optional portrait → landscape quarter turn
//! 4. [`encode`]    — PNG-encode and base64-wrap for the chat request
//! 5. [`normalize`] — stages 1–4 composed, run in `spawn_blocking`
//! 6. [`reply`]     — parse the model's text into a JSON object and a typed record

pub mod encode;
pub mod input;
pub mod normalize;
pub mod orient;
pub mod render;
pub mod reply;
