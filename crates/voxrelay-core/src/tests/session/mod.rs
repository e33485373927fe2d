mod controller;
mod state;
