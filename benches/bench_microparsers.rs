// benches/bench_microparsers.rs

//! Compare the micro-parsers that find the end of unquoted fields, and
//! whole-line parsing with quoted and unquoted formats.

#![allow(non_upper_case_globals, non_snake_case)]

extern crate criterion;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

extern crate lazy_static;
use lazy_static::lazy_static;

extern crate logpipelib;
use logpipelib::parsers::microparsers::{
    identify_end_cookie,
    identify_end_first_request_line,
    identify_end_url,
    identify_end_user_agent,
};
use logpipelib::parsers::{LineParser, LineParserFactory, LineParserP};

const REQUEST_LINE: &str = "GET /index.html?a=1&b=2 HTTP/1.1 200 512";
const URL: &str = "http://www.example.com/start.html?q=some thing&page=2 next";
const COOKIES: &str = "session=abc123; theme=dark; lang=en 200";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 200";

const FORMAT_QUOTED: &str = r#"%h %l %u %t "%r" %>s %b "%{Referer}i" "%{User-Agent}i""#;
const LINE_QUOTED: &str = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326 "http://www.example.com/start.html" "Mozilla/4.08 [en] (Win98; I ;Nav)""#;
const FORMAT_UNQUOTED: &str = r#"%h %l %u %t %r %>s %b %{Referer}i %{User-Agent}i"#;
const LINE_UNQUOTED: &str = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] GET /apache_pb.gif HTTP/1.0 200 2326 http://www.example.com/start.html Mozilla/4.08 [en] (Win98; I ;Nav)"#;

lazy_static! {
    static ref Parser_quoted: LineParserP = LineParserFactory::default()
        .resolve(FORMAT_QUOTED)
        .unwrap()
        .unwrap();
    static ref Parser_unquoted: LineParserP = LineParserFactory::default()
        .resolve(FORMAT_UNQUOTED)
        .unwrap()
        .unwrap();
}

fn mp_first_request_line() {
    black_box(identify_end_first_request_line(1, black_box(REQUEST_LINE), 0));
}

fn mp_url() {
    black_box(identify_end_url(1, black_box(URL), 0));
}

fn mp_cookie() {
    black_box(identify_end_cookie(1, black_box(COOKIES), 0));
}

fn mp_user_agent() {
    black_box(identify_end_user_agent(1, black_box(USER_AGENT), 0));
}

fn line_quoted() {
    black_box(Parser_quoted.parse_line(1, black_box(LINE_QUOTED)).ok());
}

fn line_unquoted() {
    black_box(Parser_unquoted.parse_line(1, black_box(LINE_UNQUOTED)).ok());
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut bg = c.benchmark_group("micro-parsers");
    bg.bench_function("mp_first_request_line", |b| b.iter(mp_first_request_line));
    bg.bench_function("mp_url", |b| b.iter(mp_url));
    bg.bench_function("mp_cookie", |b| b.iter(mp_cookie));
    bg.bench_function("mp_user_agent", |b| b.iter(mp_user_agent));
    bg.finish();

    let mut bg = c.benchmark_group("parse line");
    bg.bench_function("line_quoted", |b| b.iter(line_quoted));
    bg.bench_function("line_unquoted", |b| b.iter(line_unquoted));
    bg.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
