use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qrpng::{PngOptions, QrCode, QrCodeEcc};

fn bench_encode_short_text(c: &mut Criterion) {
    c.bench_function("encode_hello_m", |b| {
        b.iter(|| QrCode::encode_text(black_box("HELLO"), QrCodeEcc::Medium))
    });
}

fn bench_encode_url(c: &mut Criterion) {
    let url = "https://example.com/some/fairly/long/path?with=query&and=parameters";
    c.bench_function("encode_url_q", |b| {
        b.iter(|| QrCode::encode_text(black_box(url), QrCodeEcc::Quartile))
    });
}

fn bench_encode_version_40(c: &mut Criterion) {
    let data = vec![0x5au8; 1273];
    c.bench_function("encode_v40_h", |b| {
        b.iter(|| QrCode::encode_binary(black_box(&data), QrCodeEcc::High))
    });
}

fn bench_png(c: &mut Criterion) {
    let qr = QrCode::encode_binary(&[0x5au8; 1273], QrCodeEcc::High).unwrap();
    let options = PngOptions::default();
    c.bench_function("png_v40_default", |b| b.iter(|| black_box(&qr).to_png(&options)));
    let large = PngOptions::new(10, 40).unwrap();
    c.bench_function("png_v40_module_10", |b| b.iter(|| black_box(&qr).to_png(&large)));
}

criterion_group!(
    benches,
    bench_encode_short_text,
    bench_encode_url,
    bench_encode_version_40,
    bench_png
);
criterion_main!(benches);
