mod common;

use common::{fixture, png_bytes};
use vibecheck::{build_searcher, SearchRequest};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_searches_match_sequential_results() {
    let fx = fixture(80).await;
    let searcher = build_searcher(&fx.config).await.unwrap();

    let requests: Vec<SearchRequest> = vec![
        SearchRequest::text("cheap tacos in the lower east side", 5),
        SearchRequest::text("rooftop cocktails", 8),
        SearchRequest::text("", 4).with_image(png_bytes(11)),
        SearchRequest::text("sushi in soho", 3),
    ];
    let expected: Vec<_> = requests
        .iter()
        .map(|req| searcher.search(req).unwrap().hits)
        .collect();

    let mut handles = Vec::new();
    for round in 0..4 {
        for (i, req) in requests.iter().cloned().enumerate() {
            let searcher = searcher.clone();
            handles.push((
                i,
                round,
                tokio::task::spawn_blocking(move || searcher.search(&req)),
            ));
        }
    }

    for (i, round, handle) in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.hits, expected[i], "request {i} round {round}");
    }
}
