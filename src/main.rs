use log::debug;
use std::env;
use std::fs::File;
use std::io::prelude::*;
use zstory::dictionary::Dictionary;
use zstory::story::StoryImage;
use zstory::zobject::{format_object, ObjectSystem};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    // Display help if no story file provided; exit with success since the
    // user is asking for usage, not hitting an error
    if args.len() < 2 {
        println!("zstory - story file inspector for Z-Machine games");
        println!();
        println!("Usage: {} <story_file.dat> [--objects] [--dictionary]", args[0]);
        println!();
        println!("With no section flag, prints the header, every object and");
        println!("the dictionary. Section flags limit output to that section.");
        return Ok(());
    }

    let story_path = &args[1];
    let objects_only = args.iter().any(|a| a == "--objects");
    let dictionary_only = args.iter().any(|a| a == "--dictionary");
    let everything = !objects_only && !dictionary_only;

    debug!("Loading story file: {story_path}");
    let mut file = match File::open(story_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: Cannot open story file '{story_path}'");
            eprintln!("  {e}");
            std::process::exit(1);
        }
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let story = StoryImage::from_bytes(bytes)?;

    if everything {
        println!("{story}");
    }

    if everything || objects_only {
        println!("There are {} objects.", story.object_count()?);
        println!();
        for obj in story.object_ids()? {
            match format_object(&story, obj) {
                Ok(dump) => println!("{dump}"),
                // a malformed entry shouldn't hide the rest of the table
                Err(e) => println!("{obj}. <malformed: {e}>"),
            }
        }
    }

    if everything || dictionary_only {
        let dictionary = Dictionary::load(&story)?;
        println!("{dictionary}");
    }

    Ok(())
}
