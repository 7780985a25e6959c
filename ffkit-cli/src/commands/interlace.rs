// ffkit-cli/src/commands/interlace.rs

use ffkit_core::{CoreResult, FrameCategory, InterlaceDetector};

use crate::cli::{InterlaceArgs, ToolArgs};
use crate::config::ffmpeg_config;
use crate::output::{print_heading, print_info};

pub fn run_interlace(args: &InterlaceArgs, tools: &ToolArgs) -> CoreResult<()> {
    let detector = InterlaceDetector::new(ffmpeg_config(tools));
    let guess = detector.guess_interlacing(&args.input, args.frames)?;

    print_heading(&args.input.display().to_string());
    print_info("Frames analysed", guess.total_frames());
    for category in FrameCategory::ALL {
        print_info(
            &category.to_string(),
            format!(
                "{} ({:.1}%)",
                guess.sample().count(category),
                guess.proportion(category) * 100.0
            ),
        );
    }
    print_info("Best guess", guess.best_guess_at(args.threshold));
    print_info(
        "Interlaced",
        if guess.is_interlaced_at(args.threshold) { "yes" } else { "no" },
    );

    let filter = guess.deinterlace_filter_at(args.threshold, None);
    if !filter.is_empty() {
        print_info("Suggested filter", filter.render());
    }
    Ok(())
}
