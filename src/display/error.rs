/*
 *  display/error.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the display subsystem. Only a failed surface
 *  bring-up is fatal; everything else degrades.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Unified error type for surface operations
#[derive(Debug)]
pub enum DisplayError {
    /// No usable graphics backend at startup. The only fatal error in
    /// the display subsystem.
    DriverInit(String),

    /// A drawing primitive failed mid-frame
    Drawing(String),

    /// Capture/blit addressed pixels outside the surface
    OutOfBounds { x: i32, y: i32, width: u32, height: u32 },

    /// Operation not supported by this surface
    UnsupportedOperation,

    /// Generic error with message
    Other(String),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::DriverInit(msg) =>
                write!(f, "Display driver initialization failed: {}", msg),
            DisplayError::Drawing(msg) =>
                write!(f, "Drawing error: {}", msg),
            DisplayError::OutOfBounds { x, y, width, height } =>
                write!(f, "Region out of bounds: {}x{} at ({}, {})", width, height, x, y),
            DisplayError::UnsupportedOperation =>
                write!(f, "Operation not supported by this surface"),
            DisplayError::Other(msg) =>
                write!(f, "{}", msg),
        }
    }
}

impl Error for DisplayError {}

/// Asset lookup/decoding errors. Never fatal: callers fall back to the
/// default asset, and failing that, to a blank filled rectangle.
#[derive(Debug)]
pub enum AssetError {
    Missing(PathBuf),
    Decode(PathBuf, String),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Missing(p) =>
                write!(f, "Asset not found: {}", p.display()),
            AssetError::Decode(p, msg) =>
                write!(f, "Asset decode failed for {}: {}", p.display(), msg),
        }
    }
}

impl Error for AssetError {}
