use std::path::PathBuf;
use std::time::Instant;

use dv_rs::{
    dvtool::{DvStream, VoiceCodec},
    vocoders::mbe::MbeVocoder,
    DecodeSession, DecodedAudio,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (input, output) = match (args.next(), args.next()) {
        (Some(input), Some(output)) => (PathBuf::from(input), PathBuf::from(output)),
        _ => {
            eprintln!("usage: decode <input.dvtool> <output.wav>");
            std::process::exit(2);
        }
    };

    let stream = DvStream::read_file(&input)?;
    println!(
        "stream {:#06x} from {} to {}: {} frames",
        stream.header.stream_id,
        stream.header.header.my_callsign_str(),
        stream.header.header.ur_callsign_str(),
        stream.frames.len()
    );

    if stream.header.header.voice_codec() != VoiceCodec::Ambe {
        eprintln!("stream is not AMBE-encoded; only the mbelib backend is built in");
        std::process::exit(1);
    }

    let mut session = DecodeSession::new(MbeVocoder::new())?;

    let decode_start = Instant::now();
    let mut audio = DecodedAudio::new();
    for frame in &stream.frames {
        audio.push_frame(&session.decode_bytes(&frame.voice)?);
    }
    let decode_dur = decode_start.elapsed();

    println!(
        "decoded {:.2}s audio in {:.2?} ({} frames, {:.1}x real-time)",
        audio.duration_secs(),
        decode_dur,
        session.frames_decoded(),
        audio.duration_secs() / decode_dur.as_secs_f64()
    );

    audio.write_wav(&output)?;
    println!("saved to {}", output.display());

    Ok(())
}
