pub mod city;
pub mod error;
pub mod geo_util;
