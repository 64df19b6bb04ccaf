// Based on USB 2.0 specifications
// https://www.usb.org/document-library/usb-20-specification
// especially usb_20.pdf, chapter 8 "Protocol Layer"

pub mod crc;
pub mod layout;
pub mod packet;
pub mod pid;
pub mod record;
