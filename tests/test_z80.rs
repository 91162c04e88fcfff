//! Persistence of the machine state in the Z80 format.
use rand::prelude::*;
use zxstate::{ZxMachineNMOS, MachineConfig};
use zxstate::arch::Architecture;
use zxstate::chip::ExtCtrlFlags;
use zxstate::cpu::RegisterBank;
use zxstate::formats::SnapshotError;
use zxstate::memory::PAGE_SIZE;
use zxstate::peripherals::ay::AyRegister;
use zxstate::video::BorderColor;
use zxstate::z80emu::InterruptMode;

const HEADER_LENGTH: usize = 30;

fn v1_header(pc: u16, flags1: u8) -> Vec<u8> {
    let mut header = vec![0u8;HEADER_LENGTH];
    header[0] = 0x11; // A
    header[1] = 0x22; // F
    header[6..8].copy_from_slice(&pc.to_le_bytes());
    header[8..10].copy_from_slice(&0x6000u16.to_le_bytes());
    header[10] = 0x3F;
    header[11] = 0x7F;
    header[12] = flags1;
    header[27] = 1;
    header[28] = 1;
    header[29] = 1;
    header
}

fn push_run(out: &mut Vec<u8>, mut count: usize, fill: u8) {
    while count != 0 {
        let len = count.min(255);
        out.extend_from_slice(&[0xED, 0xED, len as u8, fill]);
        count -= len;
    }
}

#[test]
fn test_z80_v1_compressed() {
    let mut data = v1_header(0x8000, 0b0010_1011);
    push_run(&mut data, PAGE_SIZE, 0xAA);
    push_run(&mut data, PAGE_SIZE, 0xBB);
    push_run(&mut data, PAGE_SIZE, 0xCC);
    // the excess beyond the 48k address space is ignored
    push_run(&mut data, 10, 0xDD);
    data.extend_from_slice(&[0, 0xED, 0xED, 0]);

    let mut machine = ZxMachineNMOS::new(MachineConfig::default());
    assert_eq!(machine.load_z80(&data[..]).unwrap(), Architecture::Spectrum48);
    assert_eq!(machine.architecture(), Architecture::Spectrum128);
    assert_eq!(machine.memory().rom_in_use(), 1);
    assert!(machine.memory().is_paging_locked());
    assert_eq!(machine.border_color(), BorderColor::CYAN);
    let cpu = machine.cpu();
    assert_eq!(cpu.af(), 0x1122);
    assert_eq!(cpu.program_counter(), 0x8000);
    assert_eq!(cpu.stack_pointer(), 0x6000);
    assert_eq!(cpu.interrupt_vector(), 0x3F);
    assert_eq!(cpu.refresh(), 0xFF);
    assert_eq!(cpu.interrupt_mode(), InterruptMode::Mode1);
    assert!(cpu.iff1() && cpu.iff2());
    for (bank, fill) in [(5, 0xAA), (2, 0xBB), (0, 0xCC)] {
        assert!(machine.memory().ram_bank_ref(bank).unwrap().iter().all(|&b| b == fill));
    }
    assert_eq!(machine.memory().read_byte(0x4000), 0xAA);
    assert_eq!(machine.memory().read_byte(0xFFFF), 0xCC);
}

#[test]
fn test_z80_v1_uncompressed_short() {
    let mut data = v1_header(0x8000, 0);
    data.extend(core::iter::repeat(0x55).take(PAGE_SIZE + 100));

    let mut machine = ZxMachineNMOS::new(MachineConfig::new(Architecture::Spectrum48));
    assert_eq!(machine.load_z80(&data[..]).unwrap(), Architecture::Spectrum48);
    assert_eq!(machine.architecture(), Architecture::Spectrum48);
    assert_eq!(machine.border_color(), BorderColor::BLACK);
    assert_eq!(machine.cpu().refresh(), 0x7F);
    assert_eq!(machine.memory().read_byte(0x7FFF), 0x55);
    assert_eq!(machine.memory().read_byte(0x8000 + 99), 0x55);
    assert_eq!(machine.memory().read_byte(0x8000 + 100), 0);
}

#[test]
fn test_z80_v2_128k() {
    let mut data = v1_header(0, 0);
    data.extend_from_slice(&23u16.to_le_bytes());
    data.extend_from_slice(&0x4321u16.to_le_bytes());
    data.push(3); // 128k
    data.push(0b0001_0011);
    data.push(0);
    data.push(0);
    data.push(AyRegister::MixerControl as u8);
    let mut ay_regs = [0u8;16];
    ay_regs[7] = 0x38;
    ay_regs[8] = 0x0F;
    data.extend_from_slice(&ay_regs);
    data.extend_from_slice(&[0xFF, 0xFF, 7]);
    data.extend(core::iter::repeat(0x44).take(PAGE_SIZE));
    data.extend_from_slice(&[4, 0, 3]);
    push_run(&mut data, 1, 0x12);
    // unsupported blocks are skipped
    data.extend_from_slice(&[2, 0, 12, 0xFE, 0xFE]);

    let mut machine = ZxMachineNMOS::new(MachineConfig::new(Architecture::Spectrum48));
    assert_eq!(machine.load_z80(&data[..]).unwrap(), Architecture::Spectrum128);
    assert_eq!(machine.architecture(), Architecture::Spectrum128);
    assert_eq!(machine.cpu().program_counter(), 0x4321);
    assert_eq!(machine.memory().bank_latch(), 3);
    assert_eq!(machine.memory().rom_in_use(), 1);
    assert!(machine.memory().ram_bank_ref(4).unwrap().iter().all(|&b| b == 0x44));
    assert_eq!(machine.memory().ram_bank_ref(0).unwrap()[0], 0x12);
    let ay = &machine.ports().ay;
    assert_eq!(ay.selected_register(), AyRegister::MixerControl);
    assert_eq!(ay.get(AyRegister::MixerControl), 0x38);
    assert_eq!(ay.get(AyRegister::AmpLevelA), 0x0F);
}

#[test]
fn test_z80_v3_48k() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut machine = ZxMachineNMOS::new(MachineConfig::new(Architecture::Spectrum48));
    machine.memory_mut().fill_ram(|| rng.gen_range(0..4));
    machine.cpu_mut().set_program_counter(0x5B00);
    machine.cpu_mut().set_refresh(0x81);
    machine.cpu_mut().set_interrupt_mode(InterruptMode::Mode2);
    machine.port_write(0xFEFE, 4);

    let mut data = Vec::new();
    machine.save_z80(&mut data).unwrap();
    assert_eq!(&data[6..8], &[0, 0]);
    assert_eq!(&data[HEADER_LENGTH..HEADER_LENGTH + 2], &[54, 0]);
    assert_eq!(data[HEADER_LENGTH + 4], 0);

    let mut other = ZxMachineNMOS::new(MachineConfig::default().with_force_arch_on_load(true));
    assert_eq!(other.load_z80(&data[..]).unwrap(), Architecture::Spectrum48);
    assert_eq!(other.architecture(), Architecture::Spectrum48);
    assert_eq!(other.memory().rom_in_use(), 0);
    assert_eq!(other.border_color(), BorderColor::GREEN);
    assert_eq!(other.cpu().program_counter(), 0x5B00);
    assert_eq!(other.cpu().refresh(), 0x81);
    assert_eq!(other.cpu().interrupt_mode(), InterruptMode::Mode2);
    for bank in [5, 2, 0] {
        assert!(machine.memory().ram_bank_ref(bank).unwrap()[..] ==
                other.memory().ram_bank_ref(bank).unwrap()[..]);
    }
}

#[test]
fn test_z80_v3_128k() {
    let mut rng = SmallRng::seed_from_u64(128);
    let mut machine = ZxMachineNMOS::new(MachineConfig::default());
    machine.memory_mut().fill_ram(|| rng.gen());
    machine.cpu_mut().set_program_counter(0xFEDC);
    machine.port_write(0x7FFD, 0b0000_1101);
    machine.memory_mut().restore_ext_ctrl(ExtCtrlFlags::ROM_BANK_HI);
    machine.port_write(0xFFFD, AyRegister::EnvShape as u8);
    machine.port_write(0xBFFD, 0x0A);
    assert_eq!(machine.memory().rom_in_use(), 2);

    let mut data = Vec::new();
    machine.save_z80(&mut data).unwrap();
    assert_eq!(&data[HEADER_LENGTH..HEADER_LENGTH + 2], &[55, 0]);
    assert_eq!(data[HEADER_LENGTH + 4], 4);
    assert_eq!(data[HEADER_LENGTH + 5], 0b0000_1101);
    assert_eq!(data[HEADER_LENGTH + 2 + 54], 0b0000_0100);

    let mut other = ZxMachineNMOS::new(MachineConfig::default());
    assert_eq!(other.load_z80(&data[..]).unwrap(), Architecture::Spectrum128);
    assert_eq!(other.architecture(), Architecture::Spectrum128);
    assert_eq!(other.cpu().program_counter(), 0xFEDC);
    assert_eq!(other.memory().latches(), machine.memory().latches());
    assert_eq!(other.memory().screen_bank(), 7);
    assert_eq!(other.ports().ay.selected_register(), AyRegister::EnvShape);
    assert_eq!(other.ports().ay.get(AyRegister::EnvShape), 0x0A);
    for bank in 0..8 {
        assert!(machine.memory().ram_bank_ref(bank).unwrap()[..] ==
                other.memory().ram_bank_ref(bank).unwrap()[..], "RAM bank {} differs", bank);
    }
}

#[test]
fn test_z80_errors() {
    let mut machine = ZxMachineNMOS::new(MachineConfig::default());
    match machine.load_z80(&[0u8;10][..]) {
        Err(SnapshotError::Io(..)) => {}
        res => panic!("unexpected result: {:?}", res)
    }
    let mut data = v1_header(0, 0);
    data.extend_from_slice(&[40, 0]);
    data.extend_from_slice(&[0;40]);
    match machine.load_z80(&data[..]) {
        Err(SnapshotError::Format(..)) => {}
        res => panic!("unexpected result: {:?}", res)
    }
}

#[test]
fn test_z80_interrupt_mode_3() {
    let mut machine = ZxMachineNMOS::new(MachineConfig::new(Architecture::Spectrum48));
    let mut data = v1_header(0x8000, 0);
    data[29] = 3;
    assert_eq!(machine.load_z80(&data[..]).unwrap(), Architecture::Spectrum48);
    assert_eq!(machine.cpu().interrupt_mode(), InterruptMode::Mode2);
    assert_eq!(machine.cpu().program_counter(), 0x8000);
}
