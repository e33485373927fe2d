mod audio;
mod command;
mod session;
