use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use xv6fs::prelude::*;

fn populated() -> Vec<u8> {
    let mut fmt = Xv6Formatter::with_defaults().unwrap();
    for d in 0..8 {
        let dir = fmt.mkdir(XV6_ROOT_INODE, &format!("dir{d}")).unwrap();
        for f in 0..12 {
            let data = vec![(d * f) as u8; (f + 1) * XV6_BSIZE];
            fmt.create_file(dir, &format!("file{f}"), &data).unwrap();
        }
    }
    fmt.into_bytes()
}

fn bench_xv6_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("xv6_format");
    group.throughput(Throughput::Bytes(XV6_FSSIZE as u64 * XV6_BSIZE as u64));
    group.bench_function("format_default", |b| {
        b.iter(|| Xv6Formatter::with_defaults().unwrap());
    });
    group.bench_function("format_and_populate", |b| {
        b.iter(populated);
    });
    group.finish();
}

fn bench_xv6_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("xv6_check");
    let bytes = populated();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("check_all_mem", |b| {
        b.iter_with_setup(
            || bytes.clone(),
            |buf| {
                let img = Image::from_bytes(buf, XV6_FSSIZE).unwrap();
                Xv6Checker::new(img).check_all().unwrap()
            },
        );
    });

    group.bench_function("check_all_disk", |b| {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), &bytes).unwrap();
        b.iter(|| {
            Xv6Checker::open(file.path(), XV6_FSSIZE)
                .unwrap()
                .check_all()
                .unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_xv6_format, bench_xv6_check);
criterion_main!(benches);
