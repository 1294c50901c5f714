use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cozy_chess::Board;

use castellan::search::alphabeta::Searcher;
use castellan::search::control::{CancelToken, SearchControl};
use castellan::search::Session;

fn bench_search(c: &mut Criterion) {
    let b = Board::default();
    c.bench_function("search_depth_4_startpos", |ben| {
        ben.iter(|| {
            let mut session = Session::new(16);
            let ctl = SearchControl::unbounded(CancelToken::new());
            let mut searcher = Searcher::new(&mut session, &ctl, &[b.hash()]);
            let r = searcher.search_depth(black_box(&b), 4, 0);
            black_box(r.nodes)
        })
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
