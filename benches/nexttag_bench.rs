use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nexttag::prelude::*;
use nexttag::GitError;

struct NoTags;

impl TagStore for NoTags {
    fn describe(&self) -> Result<Option<String>, GitError> {
        Ok(None)
    }

    fn tag_exists(&self, _tag: &str) -> Result<bool, GitError> {
        Ok(false)
    }

    fn create_and_push(&self, _tag: &str) -> Result<Published, GitError> {
        Ok(Published::DryRun)
    }
}

fn tags() -> Vec<&'static str> {
    vec![
        "1.2.3",
        "2.1.6-rc1",
        "2.1.6-rc1-1-g75f461d",
        "2.1.6.1-dev1+devops1234",
        "2.1.6.1-dev1+devops1234-1-g8e51be0",
    ]
}

fn parse_tags(tags: &[&str]) {
    for tag in tags {
        let res = tag.parse::<Version>();
        assert!(res.is_ok());
    }
}

fn bump_tags(tags: &[&str], branch: &Branch) {
    let bumper = Bumper::new(&NoTags, &Unconfigured);
    for tag in tags {
        let version: Version = tag.parse().unwrap();
        let res = bumper.next(&version, branch, BumpLevel::Patch);
        assert!(res.is_ok());
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let dev = Branch::parse("dev").unwrap();
    let master = Branch::parse("master").unwrap();

    c.bench_function("parse_tags", |b| b.iter(|| parse_tags(black_box(&tags()))));
    c.bench_function("bump_dev", |b| {
        b.iter(|| bump_tags(black_box(&tags()), black_box(&dev)))
    });
    c.bench_function("bump_master", |b| {
        b.iter(|| bump_tags(black_box(&tags()), black_box(&master)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
