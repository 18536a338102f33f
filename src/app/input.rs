//! 看板模式的标准输入
//!
//! 平时终端按行回显；输入停机密钥期间切到 raw 模式，逐字节读取且不回显，
//! 面板上只显示掩码。

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{debug, error, warn};

const CTRL_C: u8 = 0x03;
const BACKSPACE: u8 = 0x08;
const DEL: u8 = 0x7f;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// 一整行输入
    Line(String),
    /// 密钥输入有变化，需要刷新掩码
    Edited,
    /// 密钥输入时按下 Ctrl-C
    Interrupt,
}

/// 把逐字节的输入拼成行
#[derive(Debug, Default)]
pub struct LineEditor {
    buf: Vec<u8>,
}

impl LineEditor {
    /// 尚未提交的内容
    pub fn pending(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }

    /// 喂入一个字节。`secret` 为 true 时终端处于 raw 模式：回车直接提交，退格自行处理。
    pub fn feed(&mut self, byte: u8, secret: bool) -> Option<InputEvent> {
        match byte {
            b'\n' => Some(self.take_line()),
            b'\r' if secret => Some(self.take_line()),
            b'\r' => None,
            CTRL_C if secret => {
                self.buf.clear();
                Some(InputEvent::Interrupt)
            }
            DEL | BACKSPACE if secret => {
                self.pop_char();
                Some(InputEvent::Edited)
            }
            _ if secret && byte < 0x20 => None,
            _ => {
                self.buf.push(byte);
                secret.then_some(InputEvent::Edited)
            }
        }
    }

    fn take_line(&mut self) -> InputEvent {
        let line = self.pending();
        self.buf.clear();
        InputEvent::Line(line)
    }

    fn pop_char(&mut self) {
        while let Some(byte) = self.buf.pop() {
            // UTF-8 续字节要连同首字节一起删掉
            if byte & 0xC0 != 0x80 {
                break;
            }
        }
    }
}

/// 终端 raw 模式开关，drop 时恢复
#[derive(Debug, Default)]
pub struct SecretEntryMode {
    raw: bool,
}

impl SecretEntryMode {
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// 进入或退出密钥输入。标准输入不是终端时保持原样。
    pub fn set(&mut self, secret: bool) -> std::io::Result<()> {
        if secret == self.raw {
            return Ok(());
        }
        if secret {
            if let Err(e) = enable_raw_mode() {
                warn!("无法关闭终端回显: {}", e);
                return Ok(());
            }
        } else {
            disable_raw_mode()?;
        }
        self.raw = secret;
        debug!("terminal raw mode: {}", secret);
        Ok(())
    }
}

impl Drop for SecretEntryMode {
    fn drop(&mut self) {
        if self.raw {
            if let Err(e) = disable_raw_mode() {
                error!("恢复终端模式失败: {}", e);
            }
        }
    }
}
