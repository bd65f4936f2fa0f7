//! Benchmark: parse, encode, decode and compare on a mid-size template
//! (header, computed length, text fields, array siblings, trailing wildcard).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wiretpl::{compare, parse, render, Codec, Endianness, Message};

const TEMPLATE: &str = "magic=cafebabe\r\n\
version=01\r\n\
n=len(body)\r\n\
body=68656c6c6f20776f726c64\r\n\
code=OK\r\n\
id0=1\r\n\
id1=2\r\n\
id2=3\r\n\
crc=beef\r\n\
trailer=\r\n";

fn bench_codec(c: &mut Criterion) {
    let template = parse(TEMPLATE).expect("parse");
    let codec = Codec::new(Endianness::Big);

    let mut seed = Message::new(template.clone());
    let wire = codec.encode(&mut seed).expect("encode");
    eprintln!(
        "codec bench: {} fields, {} wire bytes",
        template.len(),
        wire.len()
    );

    c.bench_function("parse_template", |b| {
        b.iter(|| parse(black_box(TEMPLATE)).expect("parse"));
    });

    c.bench_function("encode_message", |b| {
        b.iter(|| {
            let mut msg = Message::new(template.clone());
            black_box(codec.encode(&mut msg).expect("encode"))
        });
    });

    c.bench_function("decode_message", |b| {
        b.iter(|| {
            let mut msg = Message::with_payload(template.clone(), wire.clone());
            codec.decode(&mut msg).expect("decode");
            black_box(msg.leftover())
        });
    });

    c.bench_function("decode_compare", |b| {
        let mut expected = Message::new(template.clone());
        codec.encode(&mut expected).expect("encode");
        b.iter(|| {
            let mut actual = Message::with_payload(template.clone(), wire.clone());
            codec.decode(&mut actual).expect("decode");
            black_box(compare(&expected, &actual).equal)
        });
    });

    c.bench_function("render_message", |b| {
        let mut msg = Message::with_payload(template.clone(), wire.clone());
        codec.decode(&mut msg).expect("decode");
        b.iter(|| black_box(render(&msg)));
    });
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
