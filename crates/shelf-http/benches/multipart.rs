use criterion::{Criterion, black_box, criterion_group, criterion_main};
use shelf_http::{PartSink, UploadDecoder};
use std::io;

const BOUNDARY: &str = "----WebKitFormBoundaryBenchAbC12";

struct CountingSink {
    bytes: u64,
}

impl PartSink for CountingSink {
    fn open_part(&mut self, _filename: &str) -> io::Result<()> {
        Ok(())
    }

    fn write_part(&mut self, data: &[u8]) -> io::Result<()> {
        self.bytes += data.len() as u64;
        Ok(())
    }

    fn close_part(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn upload_body(file_len: usize) -> Vec<u8> {
    let content: Vec<u8> = (0..file_len).map(|i| (i % 251) as u8).collect();
    let mut body = Vec::with_capacity(file_len + 256);
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"payload.bin\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(&content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn bench_upload_decode(c: &mut Criterion) {
    let body = upload_body(256 * 1024);

    for chunk in [1024usize, 4096, 16384] {
        c.bench_function(&format!("decode_256k_upload_chunk_{chunk}"), |b| {
            b.iter(|| {
                let mut decoder = UploadDecoder::new(BOUNDARY);
                let mut sink = CountingSink { bytes: 0 };
                for piece in body.chunks(chunk) {
                    decoder.feed(black_box(piece), &mut sink).unwrap();
                }
                decoder.finish(&mut sink).unwrap();
                black_box(sink.bytes)
            });
        });
    }
}

criterion_group!(benches, bench_upload_decode);
criterion_main!(benches);
