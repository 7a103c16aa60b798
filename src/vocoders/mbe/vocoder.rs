use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

use crate::deinterleave::{DeinterleavedFrame, PLANE_COLS, PLANE_ROWS};
use crate::error::DvError;
use crate::session::{ParamSet, Vocoder, AMBE_DATA_BITS, SAMPLES_PER_FRAME};

use super::ffi;

const ERR_STR_LEN: usize = 64;

/// Opaque model-parameter set owned by mbelib.
///
/// Sessions hold three of these and forward them to every decode call;
/// nothing outside mbelib reads or writes the contents.
pub struct MbeParams(ffi::mbe_parms);

/// AMBE vocoder backed by the system mbelib library.
pub struct MbeVocoder {
    err_str: [c_char; ERR_STR_LEN],
}

impl MbeVocoder {
    pub fn new() -> Self {
        Self {
            err_str: [0; ERR_STR_LEN],
        }
    }
}

impl Default for MbeVocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocoder for MbeVocoder {
    type ModelParams = MbeParams;

    fn init_parameters(&mut self) -> Result<ParamSet<MbeParams>, DvError> {
        let mut current = std::mem::MaybeUninit::<ffi::mbe_parms>::uninit();
        let mut previous = std::mem::MaybeUninit::<ffi::mbe_parms>::uninit();
        let mut previous_enhanced = std::mem::MaybeUninit::<ffi::mbe_parms>::uninit();

        // mbe_initMbeParms fully initializes all three structures.
        unsafe {
            ffi::mbe_initMbeParms(
                current.as_mut_ptr(),
                previous.as_mut_ptr(),
                previous_enhanced.as_mut_ptr(),
            );
        }

        log::debug!("initialized mbelib parameter sets");
        Ok(ParamSet {
            current: MbeParams(unsafe { current.assume_init() }),
            previous: MbeParams(unsafe { previous.assume_init() }),
            previous_enhanced: MbeParams(unsafe { previous_enhanced.assume_init() }),
        })
    }

    fn decode(
        &mut self,
        audio_out: &mut [i16; SAMPLES_PER_FRAME],
        errs: &mut u32,
        errs2: &mut u32,
        err_desc: &mut String,
        frame: &DeinterleavedFrame,
        scratch: &mut [u8; AMBE_DATA_BITS],
        params: &mut ParamSet<MbeParams>,
        quality: i32,
    ) {
        let mut ambe_fr = [[0 as c_char; PLANE_COLS]; PLANE_ROWS];
        for (row, plane) in frame.planes().iter().enumerate() {
            for (col, &bit) in plane.iter().enumerate() {
                ambe_fr[row][col] = bit as c_char;
            }
        }

        let mut c_errs = *errs as c_int;
        let mut c_errs2 = *errs2 as c_int;
        self.err_str[0] = 0;

        unsafe {
            ffi::mbe_processAmbe3600x2400Frame(
                audio_out.as_mut_ptr(),
                &mut c_errs,
                &mut c_errs2,
                self.err_str.as_mut_ptr(),
                ambe_fr.as_mut_ptr(),
                scratch.as_mut_ptr() as *mut c_char,
                &mut params.current.0,
                &mut params.previous.0,
                &mut params.previous_enhanced.0,
                quality as c_int,
            );
        }

        *errs = c_errs.max(0) as u32;
        *errs2 = c_errs2.max(0) as u32;

        err_desc.clear();
        // err_str is NUL-terminated by mbelib.
        let desc = unsafe { CStr::from_ptr(self.err_str.as_ptr()) };
        err_desc.push_str(&desc.to_string_lossy());
    }
}
