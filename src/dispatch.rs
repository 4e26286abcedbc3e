//! Routing from a detected source format and a requested target to a
//! converter entry point.

use stickerforge_av::StickerConverter;
use stickerforge_core::{Error, JobId, Result, StickerFormat, StrategyFailure};

/// Converter entry point chosen for a source/target pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    TgsToWebp,
    WebmToWebp,
    /// WEBM with a GIF fallback.
    WebpToAnimation,
    WebpToGif,
    /// Same container; only the pack metadata is (re)embedded.
    EmbedMetadata,
}

/// Pick the route converting `source` into `target`.
///
/// # Errors
///
/// [`Error::Validation`] when no converter produces `target` from `source`.
pub fn plan(source: StickerFormat, target: StickerFormat) -> Result<Route> {
    use StickerFormat::*;

    match (source, target) {
        (Tgs, Webp | AnimatedWebp) => Ok(Route::TgsToWebp),
        (Webm, Webp | AnimatedWebp) => Ok(Route::WebmToWebp),
        (AnimatedWebp, Webm) => Ok(Route::WebpToAnimation),
        (Webp | AnimatedWebp, Gif) => Ok(Route::WebpToGif),
        (Webp, Webp) | (AnimatedWebp, AnimatedWebp | Webp) => Ok(Route::EmbedMetadata),
        _ => Err(Error::validation(format!(
            "no conversion from {source} to {target}"
        ))),
    }
}

/// Output of a dispatched conversion.
#[derive(Debug)]
pub struct Converted {
    /// Format actually produced; differs from the request after a fallback.
    pub format: StickerFormat,
    pub data: Vec<u8>,
    /// Strategies that failed before the one that produced `data`.
    pub failures: Vec<StrategyFailure>,
}

/// Run `route` on `input` under `job`.
pub fn run(
    converter: &StickerConverter,
    job: &JobId,
    route: Route,
    input: &[u8],
) -> Result<Converted> {
    let done = |format, data| Converted {
        format,
        data,
        failures: Vec::new(),
    };

    match route {
        Route::TgsToWebp => Ok(done(
            StickerFormat::AnimatedWebp,
            converter.tgs_to_webp(job, input)?,
        )),
        Route::WebmToWebp => Ok(done(
            StickerFormat::AnimatedWebp,
            converter.webm_to_webp(job, input, None, None)?,
        )),
        Route::WebpToAnimation => {
            let outcome = converter.webp_to_animation(job, input)?;
            let format = match outcome.strategy.as_str() {
                "gif" => StickerFormat::Gif,
                _ => StickerFormat::Webm,
            };
            Ok(Converted {
                format,
                data: outcome.data,
                failures: outcome.failures,
            })
        }
        Route::WebpToGif => Ok(done(StickerFormat::Gif, converter.webp_to_gif(job, input)?)),
        Route::EmbedMetadata => {
            let format = StickerFormat::detect(input).unwrap_or(StickerFormat::Webp);
            Ok(done(format, converter.embed_metadata(job, input.to_vec())?))
        }
    }
}

/// Detect the format of `input`, plan a route to `target` and run it.
pub fn convert(
    converter: &StickerConverter,
    job: &JobId,
    input: &[u8],
    target: StickerFormat,
) -> Result<Converted> {
    let source = StickerFormat::detect(input)
        .ok_or_else(|| Error::validation("unrecognized sticker format"))?;
    let route = plan(source, target)?;
    tracing::debug!(%source, %target, ?route, "dispatching conversion");
    run(converter, job, route, input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use StickerFormat::*;

    #[test]
    fn plans_supported_routes() {
        assert_eq!(plan(Tgs, Webp).unwrap(), Route::TgsToWebp);
        assert_eq!(plan(Tgs, AnimatedWebp).unwrap(), Route::TgsToWebp);
        assert_eq!(plan(Webm, Webp).unwrap(), Route::WebmToWebp);
        assert_eq!(plan(AnimatedWebp, Webm).unwrap(), Route::WebpToAnimation);
        assert_eq!(plan(AnimatedWebp, Gif).unwrap(), Route::WebpToGif);
        assert_eq!(plan(Webp, Gif).unwrap(), Route::WebpToGif);
        assert_eq!(plan(Webp, Webp).unwrap(), Route::EmbedMetadata);
    }

    #[test]
    fn rejects_unsupported_routes() {
        for (source, target) in [(Gif, Webp), (Webp, Webm), (Tgs, Gif), (Webm, Gif), (Webm, Webm)] {
            let err = plan(source, target).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{source}->{target}");
        }
    }

    #[test]
    fn convert_rejects_unknown_input() {
        let converter = StickerConverter::new(&stickerforge_core::Config::default());
        let err = convert(&converter, &JobId::generate(), b"plain text", Webp).unwrap_err();
        assert!(err.to_string().contains("unrecognized"));
    }
}
