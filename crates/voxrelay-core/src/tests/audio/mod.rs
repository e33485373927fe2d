mod recorder;
mod transcriber;
