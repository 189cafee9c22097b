mod detect;
mod normalize;
mod orient;
mod parse;
