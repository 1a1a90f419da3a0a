use anyhow::Result;
use stagecraft_client::VideoAnnotations;
use stagecraft_client::video::annotate;
use stagecraft_core::worker::SystemClock;

use super::Context;
use crate::args::VideosArgs;

pub async fn videos_impl(ctx: &Context, args: &VideosArgs) -> Result<VideoAnnotations> {
    Ok(annotate(&ctx.db, &SystemClock, &args.embeds).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::context;

    #[tokio::test]
    async fn test_videos_marks_embeds() {
        let ctx = context("http://localhost:8080").await;
        let args = VideosArgs { embeds: vec!["https://www.youtube.com/embed/JhLubfh7yRQ".into()] };

        let annotations = videos_impl(&ctx, &args).await.unwrap();
        assert_eq!(annotations.len(), 13);
        assert!(annotations.get("JhLubfh7yRQ").unwrap().cached);
    }
}
