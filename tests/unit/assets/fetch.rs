use std::io::{Cursor, Read, Write};
use std::net::TcpListener;

use super::*;

/// Serve exactly one HTTP response on a loopback port and return its URL.
fn serve_once(status: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut req = Vec::new();
        let mut buf = [0u8; 1024];
        while !req.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            req.extend_from_slice(&buf[..n]);
        }
        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(&body).unwrap();
    });
    format!("http://{addr}/fg.png")
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/fg.png")
}

#[test]
fn url_source_decodes_served_image() {
    let url = serve_once("200 OK", png_bytes(5, 3));
    let raster = ImageUrl::new(url).load().unwrap();
    assert_eq!(raster.dimensions(), (5, 3));
    assert_eq!(raster.pixel(4, 2), [10, 20, 30, 255]);
}

#[test]
fn unreachable_url_is_source_unavailable() {
    let src = ImageUrl::new(closed_port_url()).with_timeout(Duration::from_secs(2));
    let err = src.load().unwrap_err();
    assert!(matches!(err, BackdropError::SourceUnavailable(_)), "{err}");
}

#[test]
fn error_status_is_source_unavailable() {
    let url = serve_once("404 Not Found", b"missing".to_vec());
    let err = ImageUrl::new(url).load().unwrap_err();
    assert!(matches!(err, BackdropError::SourceUnavailable(_)), "{err}");
}

#[test]
fn non_image_body_is_source_unavailable() {
    let url = serve_once("200 OK", b"<html>not an image</html>".to_vec());
    let err = ImageUrl::new(url.clone()).load().unwrap_err();
    assert!(matches!(err, BackdropError::SourceUnavailable(_)));
    assert!(err.to_string().contains(&url));
}

#[test]
fn malformed_url_is_source_unavailable() {
    let err = fetch_bytes("not a url", Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, BackdropError::SourceUnavailable(_)));
}
