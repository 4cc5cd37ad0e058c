//! Safe wrapper of the Arcade Learning Environment.
use anyhow::{anyhow, Result};
use c_str_macro::c_str;
use std::ffi::CString;
use std::path::Path;

/// Emulator settings.
pub struct AleConfig {
    /// Seed of the emulator, 0 uses the current time.
    pub random_seed: i32,

    /// Opens an SDL window. Requires feature `sdl`.
    pub display_screen: bool,

    /// Probability of repeating the previous action instead of the given one.
    pub repeat_action_probability: f32,
}

pub struct Ale {
    inner: *mut atari_env_sys::ALEInterface,
}

// The interface is only used from the thread owning the environment.
unsafe impl Send for Ale {}

impl Drop for Ale {
    fn drop(&mut self) {
        unsafe {
            atari_env_sys::ALE_del(self.inner);
        }
    }
}

impl Ale {
    /// Loads a ROM image.
    ///
    /// Frame skipping and color averaging of the emulator are disabled, the
    /// pipeline repeats actions and pools frames itself.
    pub fn new(rom_path: &Path, config: AleConfig) -> Result<Self> {
        if !rom_path.is_file() {
            return Err(anyhow!("ROM image not found: {}", rom_path.display()));
        }
        let rom_path = rom_path
            .to_str()
            .ok_or_else(|| anyhow!("ROM path is not valid UTF-8: {}", rom_path.display()))?;
        let rom_path = CString::new(rom_path)?;

        let ale = unsafe { atari_env_sys::ALE_new() };
        unsafe {
            atari_env_sys::setInt(ale, c_str!("random_seed").as_ptr(), config.random_seed);
            atari_env_sys::setBool(
                ale,
                c_str!("display_screen").as_ptr(),
                config.display_screen,
            );
            atari_env_sys::setBool(ale, c_str!("sound").as_ptr(), false);
            atari_env_sys::setBool(ale, c_str!("color_averaging").as_ptr(), false);
            atari_env_sys::setInt(ale, c_str!("frame_skip").as_ptr(), 1);
            atari_env_sys::setFloat(
                ale,
                c_str!("repeat_action_probability").as_ptr(),
                config.repeat_action_probability,
            );
            atari_env_sys::loadROM(ale, rom_path.as_ptr());
            atari_env_sys::reset_game(ale);
        }

        Ok(Self { inner: ale })
    }

    /// Action codes of the minimal action set of the game.
    pub fn minimal_actions(&self) -> Vec<i32> {
        let n = unsafe { atari_env_sys::getMinimalActionSize(self.inner) } as usize;
        let mut buf = vec![0i32; n];
        unsafe {
            atari_env_sys::getMinimalActionSet(self.inner, buf.as_mut_ptr());
        }
        buf
    }

    pub fn is_game_over(&self) -> bool {
        unsafe { atari_env_sys::game_over(self.inner) }
    }

    pub fn reset(&mut self) {
        unsafe {
            atari_env_sys::reset_game(self.inner);
        }
    }

    /// Applies an action code for one frame and returns the reward.
    pub fn take_action(&mut self, action: i32) -> i32 {
        let ret: ::std::os::raw::c_int = unsafe { atari_env_sys::act(self.inner, action) };
        ret.into()
    }

    pub fn lives(&self) -> u32 {
        unsafe { atari_env_sys::lives(self.inner) as u32 }
    }

    pub fn width(&self) -> usize {
        unsafe { atari_env_sys::getScreenWidth(self.inner) as usize }
    }

    pub fn height(&self) -> usize {
        unsafe { atari_env_sys::getScreenHeight(self.inner) as usize }
    }

    /// The screen in RGB order regardless of endianness.
    pub fn rgb24(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.width() * self.height() * 3];
        unsafe {
            atari_env_sys::getScreenRGB2(self.inner, buf.as_mut_ptr());
        }
        buf
    }
}
