/*!
    Opaque codec configuration for passing to the decoder.
*/

use ffmpeg_next::codec;

use crate::convert::codec_id_from_ffmpeg;
use transcode_types::CodecId;

/**
    Codec parameters of the selected input stream.

    Hand this to `transcode-decode` to open a decoder for the stream.
*/
#[derive(Clone)]
pub struct CodecConfig {
    parameters: codec::Parameters,
}

impl CodecConfig {
    pub(crate) fn new(parameters: codec::Parameters) -> Self {
        Self { parameters }
    }

    /**
        The codec the stream was encoded with.
    */
    pub fn codec_id(&self) -> CodecId {
        codec_id_from_ffmpeg(self.parameters.id())
    }

    /**
        Consume the config, returning the raw FFmpeg parameters.
    */
    pub fn into_parameters(self) -> codec::Parameters {
        self.parameters
    }
}

impl std::fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecConfig")
            .field("codec_id", &self.parameters.id())
            .finish_non_exhaustive()
    }
}
