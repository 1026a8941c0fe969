use core::ffi::{c_int, c_void};

/// Hands `frame` to the browser's animation loop. Never returns.
pub fn set_main_loop<F: FnMut() + 'static>(frame: F) -> ! {
    extern "C" fn trampoline<F: FnMut()>(arg: *mut c_void) {
        let frame = unsafe { &mut *(arg as *mut F) };
        frame();
    }
    // Leaked on purpose: the loop runs for the rest of the page's life.
    let arg = Box::into_raw(Box::new(frame)) as *mut c_void;
    unsafe { emscripten_set_main_loop_arg(trampoline::<F>, arg, 0, 1) };
    // emscripten_set_main_loop_arg with simulate_infinite_loop set to true
    // throws an exception to stop execution of the caller, i.e. we never end
    // up here. The loop {} just reflects the actual "return value", "!".
    loop {}
}

pub type EmArgCallbackFunc = extern "C" fn(*mut c_void);
extern "C" {
    /// https://emscripten.org/docs/api_reference/emscripten.h.html#c.emscripten_set_main_loop_arg
    pub fn emscripten_set_main_loop_arg(
        func: EmArgCallbackFunc,
        arg: *mut c_void,
        fps: c_int,
        simulate_infinite_loop: c_int,
    );
}
