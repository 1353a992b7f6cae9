use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::Context as _;
use image::{
    AnimationDecoder as _, Frame, RgbaImage,
    codecs::gif::{GifDecoder, GifEncoder, Repeat},
};

/// How many leading frames of the animator's raw output to drop before
/// compositing. The current animator emits no placeholder lead-in, so every
/// frame is kept; this constant exists so a lead-in convention change is a
/// one-line edit instead of a silent skip.
pub const LEADING_FRAMES_TO_SKIP: usize = 0;

/// Paint `background_image` beneath every frame of the animation at
/// `animation`, centered, and rewrite the file in place as a looping GIF.
/// Frame count (minus [`LEADING_FRAMES_TO_SKIP`]) and per-frame delays are
/// preserved. A frame larger than the background in either dimension is an
/// error, never a crop.
pub fn apply_background(background_image: &Path, animation: &Path) -> anyhow::Result<()> {
    let background = image::open(background_image)
        .with_context(|| format!("decode background '{}'", background_image.display()))?
        .to_rgba8();

    let frames = decode_animation(animation)?;
    let composited = composite_frames(&background, frames)?;

    // Write next to the target, then rename, so a failed encode never leaves
    // a truncated animation behind.
    let tmp = animation.with_extension("gif.tmp");
    {
        let out = File::create(&tmp)
            .with_context(|| format!("create '{}'", tmp.display()))?;
        let mut encoder = GifEncoder::new(BufWriter::new(out));
        encoder
            .set_repeat(Repeat::Infinite)
            .context("set gif looping")?;
        encoder
            .encode_frames(composited)
            .context("encode composited animation")?;
    }
    std::fs::rename(&tmp, animation)
        .with_context(|| format!("replace '{}'", animation.display()))?;
    Ok(())
}

fn decode_animation(path: &Path) -> anyhow::Result<Vec<Frame>> {
    let f = File::open(path).with_context(|| format!("open animation '{}'", path.display()))?;
    let decoder = GifDecoder::new(BufReader::new(f))
        .with_context(|| format!("decode animation '{}'", path.display()))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .with_context(|| format!("read animation frames from '{}'", path.display()))?;
    if frames.len() <= LEADING_FRAMES_TO_SKIP {
        anyhow::bail!(
            "animation '{}' has {} frames, need more than {LEADING_FRAMES_TO_SKIP}",
            path.display(),
            frames.len()
        );
    }
    Ok(frames)
}

fn composite_frames(background: &RgbaImage, frames: Vec<Frame>) -> anyhow::Result<Vec<Frame>> {
    let mut out = Vec::with_capacity(frames.len());
    for frame in frames.into_iter().skip(LEADING_FRAMES_TO_SKIP) {
        let delay = frame.delay();
        let fg = frame.buffer();
        let (x, y) = centered_offset(background.dimensions(), fg.dimensions())?;

        let mut composited = background.clone();
        image::imageops::overlay(&mut composited, fg, x, y);
        out.push(Frame::from_parts(composited, 0, 0, delay));
    }
    Ok(out)
}

/// Integer pixel offset that centers a `(fw, fh)` frame on a `(bw, bh)`
/// background.
fn centered_offset((bw, bh): (u32, u32), (fw, fh): (u32, u32)) -> anyhow::Result<(i64, i64)> {
    if fw > bw || fh > bh {
        anyhow::bail!(
            "animation frame {fw}x{fh} is larger than the background {bw}x{bh}"
        );
    }
    Ok((
        i64::from((bw - fw) / 2),
        i64::from((bh - fh) / 2),
    ))
}
