//! Raw declarations for the mbelib C API.

#![allow(non_snake_case, non_camel_case_types)]

use std::os::raw::{c_char, c_int};

/// Model parameters for one analysis frame, as laid out by mbelib's
/// `mbe_parms`. The fields are only ever read and written by mbelib itself;
/// the layout must match the installed library's header.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct mbe_parms {
    pub w0: f32,
    pub L: c_int,
    pub K: c_int,
    pub Vl: [c_int; 57],
    pub Ml: [f32; 57],
    pub log2Ml: [f32; 57],
    pub PHIl: [f32; 57],
    pub PSIl: [f32; 57],
    pub gamma: f32,
    pub un: c_int,
    pub repeat: c_int,
}

#[link(name = "mbe")]
extern "C" {
    pub fn mbe_initMbeParms(
        cur_mp: *mut mbe_parms,
        prev_mp: *mut mbe_parms,
        prev_mp_enhanced: *mut mbe_parms,
    );

    pub fn mbe_processAmbe3600x2400Frame(
        aout_buf: *mut i16,
        errs: *mut c_int,
        errs2: *mut c_int,
        err_str: *mut c_char,
        ambe_fr: *mut [c_char; 24],
        ambe_d: *mut c_char,
        cur_mp: *mut mbe_parms,
        prev_mp: *mut mbe_parms,
        prev_mp_enhanced: *mut mbe_parms,
        uvquality: c_int,
    );
}
