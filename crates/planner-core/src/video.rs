use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoProvider {
    YouTube,
    Vimeo,
    GoogleDrive,
}

/// Recognizes a provider link and returns its embeddable form together with
/// the provider. `None` when the URL is unparseable or unrecognized.
pub fn embed_target(raw: &str) -> Option<(VideoProvider, String)> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?;

    if host.contains("youtube.com")
        && let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "v")
        && !id.is_empty()
    {
        return Some((VideoProvider::YouTube, format!("https://www.youtube.com/embed/{id}")));
    }

    if host.contains("youtu.be") {
        let id = url.path().trim_start_matches('/');
        if !id.is_empty() {
            return Some((VideoProvider::YouTube, format!("https://www.youtube.com/embed/{id}")));
        }
    }

    if host.contains("vimeo.com")
        && let Some(id) = url.path_segments().and_then(|mut segments| segments.find(|s| !s.is_empty()))
    {
        return Some((VideoProvider::Vimeo, format!("https://player.vimeo.com/video/{id}")));
    }

    if host.contains("drive.google.com") {
        let parts: Vec<&str> = url.path().split('/').collect();
        if parts.contains(&"file")
            && let Some(idx) = parts.iter().position(|part| *part == "d")
            && let Some(id) = parts.get(idx + 1).filter(|id| !id.is_empty())
        {
            return Some((
                VideoProvider::GoogleDrive,
                format!("https://drive.google.com/file/d/{id}/preview"),
            ));
        }
    }

    None
}

pub fn video_provider(raw: &str) -> Option<VideoProvider> {
    embed_target(raw).map(|(provider, _)| provider)
}

/// The URL to put in an embedding frame. Anything that is not a recognized
/// provider link comes back verbatim; it may or may not embed.
pub fn embed_url(raw: &str) -> String {
    match embed_target(raw) {
        Some((_, embed)) => embed,
        None => {
            tracing::trace!(url = %raw, "no embeddable form; using url as given");
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_urls() {
        assert_eq!(
            embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
        assert_eq!(embed_url("https://youtu.be/abc123"), "https://www.youtube.com/embed/abc123");
        assert_eq!(video_provider("https://youtu.be/abc123"), Some(VideoProvider::YouTube));
    }

    #[test]
    fn test_youtube_without_video_id_passes_through() {
        let raw = "https://www.youtube.com/feed/subscriptions";
        assert_eq!(embed_url(raw), raw);
        assert_eq!(embed_url("https://youtu.be/"), "https://youtu.be/");
    }

    #[test]
    fn test_vimeo_url() {
        assert_eq!(
            embed_url("https://vimeo.com/76979871"),
            "https://player.vimeo.com/video/76979871"
        );
    }

    #[test]
    fn test_google_drive_url() {
        assert_eq!(
            embed_url("https://drive.google.com/file/d/1AbCdEf/view?usp=sharing"),
            "https://drive.google.com/file/d/1AbCdEf/preview"
        );
        let folder = "https://drive.google.com/drive/folders/xyz";
        assert_eq!(embed_url(folder), folder);
        assert_eq!(video_provider(folder), None);
    }

    #[test]
    fn test_other_urls_pass_through() {
        assert_eq!(embed_url("https://example.com/video.mp4"), "https://example.com/video.mp4");
        assert_eq!(embed_url("not a url"), "not a url");
        assert_eq!(embed_url(""), "");
    }
}
