//! Minimal PE metadata reader
//!
//! The operator-override channel trusts the binary itself, not a catalog, so it
//! needs two facts straight out of the executable image: the COFF machine field
//! (bitness) and the product version out of the `VS_FIXEDFILEINFO` block.
//! Reading just those takes a few offsets; a full PE parser would be overkill.
//!
//! The version block is found by scanning for its fixed signature rather than
//! walking the resource directory. `VS_FIXEDFILEINFO` starts with the constant
//! `0xFEEF04BD`, and nothing else in a well-formed image contains it.

use std::fs;
use std::path::Path;

use crate::version::ProductVersion;

const DOS_MAGIC: &[u8] = b"MZ";
const PE_MAGIC: &[u8] = b"PE\0\0";
const PE_OFFSET_FIELD: usize = 0x3c;

const IMAGE_FILE_MACHINE_I386: u16 = 0x014c;
const IMAGE_FILE_MACHINE_AMD64: u16 = 0x8664;
const IMAGE_FILE_MACHINE_ARM64: u16 = 0xaa64;

/// `VS_FIXEDFILEINFO.dwSignature`
const FIXEDFILEINFO_SIGNATURE: u32 = 0xfeef_04bd;

/// Facts read from an executable image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryInfo {
    pub is_64bit: bool,
    pub version: ProductVersion,
}

/// Read bitness and product version from a PE file.
///
/// Returns `None` when the header cannot be read or is not a known PE machine
/// type; the caller drops the candidate. A readable header with no version
/// block yields the zero version, which keeps the candidate selectable.
pub fn inspect(path: &Path) -> Option<BinaryInfo> {
    let data = fs::read(path).ok()?;
    let machine = parse_machine(&data)?;

    let is_64bit = match machine {
        IMAGE_FILE_MACHINE_AMD64 | IMAGE_FILE_MACHINE_ARM64 => true,
        IMAGE_FILE_MACHINE_I386 => false,
        _ => return None,
    };

    let version = parse_fixed_version(&data).unwrap_or(ProductVersion::ZERO);

    Some(BinaryInfo { is_64bit, version })
}

fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_le_bytes([*data.get(at)?, *data.get(at + 1)?]))
}

fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes([
        *data.get(at)?,
        *data.get(at + 1)?,
        *data.get(at + 2)?,
        *data.get(at + 3)?,
    ]))
}

/// COFF machine field: DOS header -> e_lfanew -> "PE\0\0" -> machine.
fn parse_machine(data: &[u8]) -> Option<u16> {
    if data.get(..2)? != DOS_MAGIC {
        return None;
    }
    let pe_offset = read_u32(data, PE_OFFSET_FIELD)? as usize;
    if data.get(pe_offset..pe_offset + 4)? != PE_MAGIC {
        return None;
    }
    read_u16(data, pe_offset + 4)
}

/// Locate `VS_FIXEDFILEINFO` by signature and decode its product version.
///
/// Layout after the signature: dwStrucVersion, dwFileVersionMS, dwFileVersionLS,
/// dwProductVersionMS, dwProductVersionLS. Each version word packs two u16
/// components, high word first.
fn parse_fixed_version(data: &[u8]) -> Option<ProductVersion> {
    let sig = FIXEDFILEINFO_SIGNATURE.to_le_bytes();
    let at = data.windows(4).position(|w| w == sig)?;

    let product_ms = read_u32(data, at + 16)?;
    let product_ls = read_u32(data, at + 20)?;

    Some(ProductVersion::new(
        product_ms >> 16,
        product_ms & 0xffff,
        product_ls >> 16,
        product_ls & 0xffff,
    ))
}
