use log::*;

use crate::compiler::{codegen::ENTRY_POINT, postfix::Inst};

use super::{
    image::{Image, Symbol, CODE_BASE, MEMORY_SIZE, NATIVE_BASE},
    runtime::{Console, Native},
    VmError, VmResult,
};

/// Return address that ends the program when the entry point returns to it.
const HALT: i32 = 0;

enum Flow {
    Continue,
    Halt,
}

/**
Executes a postfix program.

The machine has a program counter, a stack pointer and a frame pointer, plus
two result slots: a 32 bit one and a 64 bit one.  A frame looks like this,
from high to low addresses:

```text
    argument n ... argument 1     pushed by the caller
    return address                pushed by BRANCH or CALL
    saved frame pointer           <- fp, pushed by ENTER
    locals                        fp - 1 and down
```
 */
pub struct Machine {
    image: Image,
    console: Console,
    pc: usize,
    sp: usize,
    fp: usize,
    fval32: i32,
    fval64: f64,
    steps: u64,
    step_limit: Option<u64>,
}

impl Machine {
    pub fn load(listing: &[Inst]) -> VmResult<Machine> {
        Ok(Machine {
            image: Image::load(listing)?,
            console: Console::default(),
            pc: 0,
            sp: MEMORY_SIZE,
            fp: MEMORY_SIZE,
            fval32: 0,
            fval64: 0.0,
            steps: 0,
            step_limit: None,
        })
    }

    /// Values handed out, in order, by `readi` and `readd`.
    pub fn with_input<S: Into<String>>(mut self, input: Vec<S>) -> Machine {
        self.console = Console::new(input);
        self
    }

    /// Aborts the run after `limit` instructions.
    pub fn with_step_limit(mut self, limit: u64) -> Machine {
        self.step_limit = Some(limit);
        self
    }

    /// Everything the program printed so far.
    pub fn output(&self) -> &str {
        self.console.output()
    }

    /// Runs the program from its entry point and returns its exit code.
    pub fn run(&mut self) -> VmResult<i32> {
        self.pc = self.image.code_label(ENTRY_POINT)?;
        self.push_i32(HALT)?;

        loop {
            if let Some(limit) = self.step_limit {
                if self.steps >= limit {
                    return Err(VmError::StepLimit(limit));
                }
            }
            self.steps += 1;

            let inst = self
                .image
                .code
                .get(self.pc)
                .cloned()
                .ok_or(VmError::PcOutOfBounds(self.pc))?;
            trace!("{:>6} sp={:#x} {}", self.pc, self.sp, inst);
            self.pc += 1;

            if let Flow::Halt = self.execute(inst)? {
                debug!("Halted after {} steps with {}", self.steps, self.fval32);
                return Ok(self.fval32);
            }
        }
    }

    fn execute(&mut self, inst: Inst) -> VmResult<Flow> {
        match inst {
            Inst::Int(v) => self.push_i32(v)?,
            Inst::Double(v) => self.push_f64(v)?,
            Inst::Addr(name) => {
                let addr = self.image.symbol(&name)?.address();
                self.push_i32(addr)?
            }
            Inst::Local(offset) => self.push_i32(self.fp as i32 + offset)?,
            Inst::LdInt => {
                let addr = self.pop_i32()?;
                let v = self.read_i32(addr)?;
                self.push_i32(v)?
            }
            Inst::LdDouble => {
                let addr = self.pop_i32()?;
                let v = self.read_f64(addr)?;
                self.push_f64(v)?
            }
            Inst::StInt => {
                let addr = self.pop_i32()?;
                let v = self.pop_i32()?;
                self.write(addr, &v.to_le_bytes())?
            }
            Inst::StDouble => {
                let addr = self.pop_i32()?;
                let v = self.pop_f64()?;
                self.write(addr, &v.to_le_bytes())?
            }
            Inst::Dup32 => {
                let v = self.peek_i32()?;
                self.push_i32(v)?
            }
            Inst::Dup64 => {
                let v = self.peek_f64()?;
                self.push_f64(v)?
            }
            Inst::Trash(n) => self.release(n)?,

            Inst::Add => self.int_op(|l, r| Ok(l.wrapping_add(r)))?,
            Inst::Sub => self.int_op(|l, r| Ok(l.wrapping_sub(r)))?,
            Inst::Mul => self.int_op(|l, r| Ok(l.wrapping_mul(r)))?,
            Inst::Div => self.int_op(|l, r| checked(r).map(|r| l.wrapping_div(r)))?,
            Inst::Mod => self.int_op(|l, r| checked(r).map(|r| l.wrapping_rem(r)))?,
            Inst::Neg => {
                let v = self.pop_i32()?;
                self.push_i32(v.wrapping_neg())?
            }
            Inst::DAdd => self.double_op(|l, r| l + r)?,
            Inst::DSub => self.double_op(|l, r| l - r)?,
            Inst::DMul => self.double_op(|l, r| l * r)?,
            Inst::DDiv => self.double_op(|l, r| l / r)?,
            Inst::DNeg => {
                let v = self.pop_f64()?;
                self.push_f64(-v)?
            }
            Inst::I2D => {
                let v = self.pop_i32()?;
                self.push_f64(v as f64)?
            }
            Inst::D2I => {
                let v = self.pop_f64()?;
                self.push_i32(v as i32)?
            }

            Inst::Lt => self.int_op(|l, r| Ok((l < r) as i32))?,
            Inst::Le => self.int_op(|l, r| Ok((l <= r) as i32))?,
            Inst::Gt => self.int_op(|l, r| Ok((l > r) as i32))?,
            Inst::Ge => self.int_op(|l, r| Ok((l >= r) as i32))?,
            Inst::Eq => self.int_op(|l, r| Ok((l == r) as i32))?,
            Inst::Ne => self.int_op(|l, r| Ok((l != r) as i32))?,
            Inst::DCmp => {
                let r = self.pop_f64()?;
                let l = self.pop_f64()?;
                let c = if l < r {
                    -1
                } else if l > r {
                    1
                } else {
                    0
                };
                self.push_i32(c)?
            }
            Inst::And => self.int_op(|l, r| Ok((l != 0 && r != 0) as i32))?,
            Inst::Or => self.int_op(|l, r| Ok((l != 0 || r != 0) as i32))?,

            Inst::Jmp(label) => self.pc = self.image.code_label(&label)?,
            Inst::Jz(label) => {
                if self.pop_i32()? == 0 {
                    self.pc = self.image.code_label(&label)?
                }
            }
            Inst::Jnz(label) => {
                if self.pop_i32()? != 0 {
                    self.pc = self.image.code_label(&label)?
                }
            }
            Inst::Enter(size) => {
                self.push_i32(self.fp as i32)?;
                self.fp = self.sp;
                self.reserve(size)?
            }
            Inst::Leave => {
                self.sp = self.fp;
                self.fp = self.pop_address()?
            }
            Inst::Ret => {
                let target = self.pop_i32()?;
                if target == HALT {
                    return Ok(Flow::Halt);
                }
                self.pc = code_index(target)?
            }
            Inst::Call(name) => match self.image.symbol(&name)? {
                Symbol::Native(native) => self.call_native(native)?,
                Symbol::Code(pc) => self.branch(pc)?,
                Symbol::Data(_) => return Err(VmError::NotCode(name)),
            },
            Inst::Branch => {
                let target = self.pop_i32()?;
                match Native::from_address(target.wrapping_sub(NATIVE_BASE)) {
                    Some(native) if target >= NATIVE_BASE => self.call_native(native)?,
                    _ => self.branch(code_index(target)?)?,
                }
            }
            Inst::StFval32 => self.fval32 = self.pop_i32()?,
            Inst::StFval64 => self.fval64 = self.pop_f64()?,
            Inst::LdFval32 => self.push_i32(self.fval32)?,
            Inst::LdFval64 => self.push_f64(self.fval64)?,
            Inst::Alloc => {
                let n = self.pop_i32()?;
                let rounded = n.checked_add(3).ok_or(VmError::StackOverflow)?;
                self.reserve(rounded & !3)?
            }
            Inst::Sp => self.push_i32(self.sp as i32)?,

            directive => debug!("Skipping {}", directive),
        }
        Ok(Flow::Continue)
    }

    fn branch(&mut self, target: usize) -> VmResult<()> {
        self.push_i32(CODE_BASE + self.pc as i32)?;
        self.pc = target;
        Ok(())
    }

    /// Runs a runtime routine.  Arguments are read from the top of the stack
    /// and left there for the caller to remove.
    fn call_native(&mut self, native: Native) -> VmResult<()> {
        trace!("Native {:?}", native);
        match native {
            Native::ReadI => {
                let v = self.next_input()?;
                let v: i32 = v.trim().parse().map_err(|_| VmError::BadInput(v.clone()))?;
                self.fval32 = v;
                self.fval64 = v as f64;
            }
            Native::ReadD => {
                let v = self.next_input()?;
                let v: f64 = v.trim().parse().map_err(|_| VmError::BadInput(v.clone()))?;
                self.fval64 = v;
                self.fval32 = v as i32;
            }
            Native::PrintI => {
                let v = self.peek_i32()?;
                self.console.write(&v.to_string())
            }
            Native::PrintD => {
                let v = self.peek_f64()?;
                self.console.write(&v.to_string())
            }
            Native::PrintS => {
                let addr = self.peek_i32()?;
                let s = self.read_string(addr)?;
                self.console.write(&s)
            }
            Native::PrintLn => self.console.write("\n"),
        }
        Ok(())
    }

    fn next_input(&mut self) -> VmResult<String> {
        self.console.next_input().ok_or(VmError::MissingInput)
    }

    fn int_op<F>(&mut self, f: F) -> VmResult<()>
    where
        F: Fn(i32, i32) -> VmResult<i32>,
    {
        let r = self.pop_i32()?;
        let l = self.pop_i32()?;
        self.push_i32(f(l, r)?)
    }

    fn double_op<F>(&mut self, f: F) -> VmResult<()>
    where
        F: Fn(f64, f64) -> f64,
    {
        let r = self.pop_f64()?;
        let l = self.pop_f64()?;
        self.push_f64(f(l, r))
    }

    fn reserve(&mut self, size: i32) -> VmResult<()> {
        let size = size.max(0) as usize;
        if self.sp < self.image.data_end + size {
            return Err(VmError::StackOverflow);
        }
        self.sp -= size;
        Ok(())
    }

    fn release(&mut self, size: i32) -> VmResult<()> {
        let size = size.max(0) as usize;
        if self.sp + size > MEMORY_SIZE {
            return Err(VmError::StackUnderflow);
        }
        self.sp += size;
        Ok(())
    }

    fn push_i32(&mut self, v: i32) -> VmResult<()> {
        self.reserve(4)?;
        self.write(self.sp as i32, &v.to_le_bytes())
    }

    fn push_f64(&mut self, v: f64) -> VmResult<()> {
        self.reserve(8)?;
        self.write(self.sp as i32, &v.to_le_bytes())
    }

    fn peek_i32(&self) -> VmResult<i32> {
        if self.sp + 4 > MEMORY_SIZE {
            return Err(VmError::StackUnderflow);
        }
        self.read_i32(self.sp as i32)
    }

    fn peek_f64(&self) -> VmResult<f64> {
        if self.sp + 8 > MEMORY_SIZE {
            return Err(VmError::StackUnderflow);
        }
        self.read_f64(self.sp as i32)
    }

    fn pop_i32(&mut self) -> VmResult<i32> {
        let v = self.peek_i32()?;
        self.sp += 4;
        Ok(v)
    }

    fn pop_f64(&mut self) -> VmResult<f64> {
        let v = self.peek_f64()?;
        self.sp += 8;
        Ok(v)
    }

    fn pop_address(&mut self) -> VmResult<usize> {
        let addr = self.pop_i32()?;
        usize_address(addr, 0).map(|_| addr as usize)
    }

    fn read<const N: usize>(&self, addr: i32) -> VmResult<[u8; N]> {
        let start = usize_address(addr, N)?;
        let mut bytes = [0; N];
        bytes.copy_from_slice(&self.image.memory[start..start + N]);
        Ok(bytes)
    }

    fn read_i32(&self, addr: i32) -> VmResult<i32> {
        Ok(i32::from_le_bytes(self.read::<4>(addr)?))
    }

    fn read_f64(&self, addr: i32) -> VmResult<f64> {
        Ok(f64::from_le_bytes(self.read::<8>(addr)?))
    }

    fn read_string(&self, addr: i32) -> VmResult<String> {
        let start = usize_address(addr, 0)?;
        let len = self.image.memory[start..]
            .iter()
            .position(|b| *b == 0)
            .ok_or(VmError::BadAddress(addr))?;
        Ok(String::from_utf8_lossy(&self.image.memory[start..start + len]).into_owned())
    }

    fn write(&mut self, addr: i32, bytes: &[u8]) -> VmResult<()> {
        let start = usize_address(addr, bytes.len())?;
        self.image.memory[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

/// Converts `addr` into an index into memory, checking that `len` bytes
/// starting there are addressable.
fn usize_address(addr: i32, len: usize) -> VmResult<usize> {
    if addr <= 0 || addr as usize + len > MEMORY_SIZE {
        return Err(VmError::BadAddress(addr));
    }
    Ok(addr as usize)
}

fn checked(divisor: i32) -> VmResult<i32> {
    if divisor == 0 {
        Err(VmError::DivisionByZero)
    } else {
        Ok(divisor)
    }
}

fn code_index(target: i32) -> VmResult<usize> {
    if target < CODE_BASE || target >= NATIVE_BASE {
        return Err(VmError::BadCodeAddress(target));
    }
    Ok((target - CODE_BASE) as usize)
}
