mod mnist;
mod transforms;
