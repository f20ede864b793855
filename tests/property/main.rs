mod normalization_properties;
mod overlap_properties;
