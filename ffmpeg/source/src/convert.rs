/*!
    Conversions between ffmpeg-next types and transcoder types.
*/

use transcode_types::{CodecId, Error, PixelFormat, Rational};

pub fn rational_from_ffmpeg(r: ffmpeg_next::Rational) -> Rational {
    Rational::new(r.numerator(), r.denominator())
}

/**
    Convert an ffmpeg_next rational, treating `0/x` and `x/0` as unknown.
*/
pub fn known_rational_from_ffmpeg(r: ffmpeg_next::Rational) -> Option<Rational> {
    Some(rational_from_ffmpeg(r)).filter(|r| r.is_positive())
}

pub fn pixel_format_from_ffmpeg(format: ffmpeg_next::format::Pixel) -> Option<PixelFormat> {
    use ffmpeg_next::format::Pixel;

    match format {
        Pixel::YUV420P => Some(PixelFormat::Yuv420p),
        Pixel::NV12 => Some(PixelFormat::Nv12),
        Pixel::BGRA => Some(PixelFormat::Bgra),
        Pixel::RGBA => Some(PixelFormat::Rgba),
        Pixel::RGB24 => Some(PixelFormat::Rgb24),
        Pixel::BGR24 => Some(PixelFormat::Bgr24),
        Pixel::YUV422P => Some(PixelFormat::Yuv422p),
        Pixel::YUV444P => Some(PixelFormat::Yuv444p),
        Pixel::YUV420P10LE | Pixel::YUV420P10BE => Some(PixelFormat::Yuv420p10),
        Pixel::P010LE | Pixel::P010BE => Some(PixelFormat::P010le),
        _ => None,
    }
}

pub fn codec_id_from_ffmpeg(id: ffmpeg_next::codec::Id) -> CodecId {
    use ffmpeg_next::codec::Id;

    match id {
        Id::H264 => CodecId::H264,
        Id::HEVC => CodecId::H265,
        Id::VP8 => CodecId::Vp8,
        Id::VP9 => CodecId::Vp9,
        Id::AV1 => CodecId::Av1,
        Id::MPEG4 => CodecId::Mpeg4,
        Id::MPEG2VIDEO => CodecId::Mpeg2Video,
        _ => CodecId::Unknown,
    }
}

/**
    Map an error from opening an input.

    POSIX errors (missing file, permissions) become `Error::Io` so callers
    can tell a bad path from a bad file.
*/
pub fn open_error(path: &std::path::Path, error: ffmpeg_next::Error) -> Error {
    match error {
        ffmpeg_next::Error::Other { errno } => Error::Io(std::io::Error::new(
            std::io::Error::from_raw_os_error(errno).kind(),
            format!("{}: {}", path.display(), error),
        )),
        ffmpeg_next::Error::InvalidData => {
            Error::invalid_data(format!("{}: {}", path.display(), error))
        }
        other => Error::codec(format!("failed to open {}: {}", path.display(), other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_rationals_are_dropped() {
        assert_eq!(
            known_rational_from_ffmpeg(ffmpeg_next::Rational::new(0, 1)),
            None
        );
        assert_eq!(
            known_rational_from_ffmpeg(ffmpeg_next::Rational::new(25, 1)),
            Some(Rational::new(25, 1))
        );
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let err = open_error(
            std::path::Path::new("missing.mp4"),
            ffmpeg_next::Error::Other { errno: 2 },
        );
        assert!(err.is_not_found());
        assert!(err.to_string().contains("missing.mp4"));
    }

    #[test]
    fn codec_ids_map_known_names() {
        use ffmpeg_next::codec::Id;

        assert_eq!(codec_id_from_ffmpeg(Id::HEVC), CodecId::H265);
        assert_eq!(codec_id_from_ffmpeg(Id::PRORES), CodecId::Unknown);
    }
}
