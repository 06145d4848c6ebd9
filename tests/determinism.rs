mod common;

use common::{fixture, png_bytes, RAMEN_QUERY};
use vibecheck::{build_searcher, PipelineError, SearchRequest};

#[tokio::test]
async fn same_query_same_vector_and_results() -> Result<(), PipelineError> {
    let fx = fixture(40).await;
    let searcher = build_searcher(&fx.config).await?;

    let encoder = searcher.encoder();
    let a = encoder.encode(RAMEN_QUERY, Some(&png_bytes(5)))?;
    let b = encoder.encode(RAMEN_QUERY, Some(&png_bytes(5)))?;
    assert_eq!(a, b);

    let req = SearchRequest::text("quiet wine bar", 6).with_image(png_bytes(7));
    let first = searcher.search(&req)?;
    let second = searcher.search(&req)?;
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn separately_built_pipelines_agree() -> Result<(), PipelineError> {
    let fx = fixture(40).await;
    let one = build_searcher(&fx.config).await?;
    let two = build_searcher(&fx.config).await?;

    let req = SearchRequest::text("date night in the west village", 5);
    assert_eq!(one.search(&req)?.hits, two.search(&req)?.hits);
    Ok(())
}
