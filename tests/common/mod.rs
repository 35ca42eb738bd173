#![allow(dead_code)]

pub use sitepipe_test_utils::{init_tracing, with_timeout, SiteConfigBuilder, SiteFixture};

pub const ICON_HOME: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!-- Generator: a vector editor -->
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
     viewBox="0 0 24 24" width="24" height="24" inkscape:version="1.3">
  <metadata><rdf>whatever</rdf></metadata>
  <path d="M3 12l9-9 9 9" stroke="#000" stroke-width="2" fill="none"/>
  <rect x="6" y="12" width="12" height="9" fill="#333" inkscape:label="body"/>
</svg>
"##;

pub const ICON_MAIL: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 32 32" preserveAspectRatio="xMidYMid meet">
  <g fill="red"><path d="M2 6h28v20H2z" stroke-linecap="round"/></g>
</svg>
"##;

/// Uncompressed RGBA PNG of one colour, plus a text chunk, so there is
/// always something for an optimizer to remove.
pub fn solid_png(width: u32, height: u32) -> Vec<u8> {
    let mut raw = Vec::new();
    for _ in 0..height {
        raw.push(0u8);
        for _ in 0..width {
            raw.extend_from_slice(&[200, 30, 30, 255]);
        }
    }
    assert!(raw.len() <= 0xFFFF, "fixture image too large for one stored block");

    // zlib stream with a single stored deflate block.
    let len = raw.len() as u16;
    let mut zlib = vec![0x78, 0x01, 0x01];
    zlib.extend_from_slice(&len.to_le_bytes());
    zlib.extend_from_slice(&(!len).to_le_bytes());
    zlib.extend_from_slice(&raw);
    zlib.extend_from_slice(&adler32(&raw).to_be_bytes());

    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[8, 6, 0, 0, 0]);

    let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
    png_chunk(&mut png, b"IHDR", &ihdr);
    png_chunk(&mut png, b"tEXt", b"Comment\0written by the test fixture builder");
    png_chunk(&mut png, b"IDAT", &zlib);
    png_chunk(&mut png, b"IEND", &[]);
    png
}

fn png_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    let start = out.len();
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    let crc = crc32(&out[start..]);
    out.extend_from_slice(&crc.to_be_bytes());
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

fn adler32(data: &[u8]) -> u32 {
    let (mut a, mut b) = (1u32, 0u32);
    for &byte in data {
        a = (a + u32::from(byte)) % 65521;
        b = (b + a) % 65521;
    }
    (b << 16) | a
}

fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut seg = vec![0xFF, marker];
    seg.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    seg.extend_from_slice(payload);
    seg
}

/// Structurally valid JPEG stream with JFIF, EXIF, ICC and comment segments.
/// The scan data is filler; nothing here decodes pixels.
pub fn jpeg_with_metadata() -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8];
    jpeg.extend(segment(0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0"));
    jpeg.extend(segment(0xE1, b"Exif\0\0camera=test;gps=52.1,4.3"));
    jpeg.extend(segment(0xE2, b"ICC_PROFILE\0\x01\x01profile"));
    jpeg.extend(segment(0xFE, b"shot by someone"));
    jpeg.extend(segment(0xDB, &[0u8; 65]));
    jpeg.extend(segment(0xDA, &[1, 1, 0, 0, 63, 0]));
    jpeg.extend_from_slice(&[0x12, 0x34, 0xFF, 0x00, 0x56, 0xFF, 0xD0, 0x78]);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// The same stream with only the kept segments.
pub fn jpeg_without_metadata() -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8];
    jpeg.extend(segment(0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0"));
    jpeg.extend(segment(0xE2, b"ICC_PROFILE\0\x01\x01profile"));
    jpeg.extend(segment(0xDB, &[0u8; 65]));
    jpeg.extend(segment(0xDA, &[1, 1, 0, 0, 63, 0]));
    jpeg.extend_from_slice(&[0x12, 0x34, 0xFF, 0x00, 0x56, 0xFF, 0xD0, 0x78]);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

pub const STYLE_SCSS: &str = r#"@import "vars";

.nav {
  color: $brand;
  user-select: none;

  a {
    text-decoration: none;
    &:hover { color: darken($brand, 10%); }
  }
}
"#;

pub const VARS_SCSS: &str = "$brand: #3366cc;\n";

/// A small but complete source tree under `src/`.
pub fn write_site(fx: &SiteFixture) {
    fx.write("src/index.html", "<html><head><link rel=\"stylesheet\" href=\"css/style.css\"></head><body><h1>Hi</h1></body></html>")
        .write("src/about/index.html", "<html><body>About</body></html>")
        .write("src/fonts/body.woff2", b"wOF2 font bytes")
        .write("src/fonts/sub/head.woff", b"wOFF font bytes")
        .write("src/fonts/readme.txt", "not a font")
        .write("src/js/app.js", "console.log('hi');")
        .write("src/img/hero.png", solid_png(16, 16))
        .write("src/img/photos/beach.jpg", jpeg_with_metadata())
        .write("src/img/logo.svg", ICON_HOME)
        .write("src/img/banner.webp", b"RIFF\0\0\0\0WEBPVP8 fake")
        .write("src/img/sprite/home.svg", ICON_HOME)
        .write("src/img/sprite/mail.svg", ICON_MAIL)
        .write("src/sass/style.scss", STYLE_SCSS)
        .write("src/sass/_vars.scss", VARS_SCSS);
}
