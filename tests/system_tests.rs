//! Prebuilt boards run end to end.

mod common;

use common::{init_logger, v};
use rusty_logic::board::ProbeReading;
use rusty_logic::systems::adder::adder_board;
use rusty_logic::systems::ben_eater::{instruction, BenEater, ADD, HLT, LDA, LDI, OUT, STA};
use rusty_logic::systems::lcd_demo::{lcd_board, lcd_board_with};
use rusty_logic::SimError;

#[cfg(test)]
mod ben_eater_tests {
    use super::*;

    #[test]
    fn test_add_two_numbers() {
        init_logger();
        let program = [
            instruction(LDA, 14),
            instruction(ADD, 15),
            instruction(OUT, 0),
            instruction(HLT, 0),
            0,
            0,
            0,
            0,
            0,
            0,
            0,
            0,
            0,
            0,
            7,
            8,
        ];
        let mut cpu = BenEater::new(&program).unwrap();
        cpu.init().unwrap();

        let ticks = cpu.run_until_halt(100).unwrap();
        assert_eq!(ticks, 17);
        assert!(cpu.halted().unwrap());
        assert_eq!(cpu.output(), v(15));
        assert_eq!(cpu.pc.borrow().value(), &v(4));
        assert_eq!(cpu.board.probe("OUT").unwrap().render(), "15");

        // the halted clock no longer reaches the registers
        cpu.board.tick_clock(5).unwrap();
        assert_eq!(cpu.pc.borrow().value(), &v(4));
    }

    #[test]
    fn test_store_and_immediate_load() {
        let program = [
            instruction(LDI, 9),
            instruction(STA, 15),
            instruction(LDI, 1),
            instruction(ADD, 15),
            instruction(OUT, 0),
            instruction(HLT, 0),
        ];
        let mut cpu = BenEater::new(&program).unwrap();
        cpu.init().unwrap();
        cpu.run_until_halt(200).unwrap();
        assert!(cpu.halted().unwrap());
        assert_eq!(cpu.ram.borrow().content()[15], v(9));
        assert_eq!(cpu.output(), v(10));
        assert_eq!(cpu.a.borrow().value(), &v(10));
    }

    #[test]
    fn test_demo_multiplies() {
        init_logger();
        let mut cpu = BenEater::with_demo().unwrap();
        cpu.init().unwrap();
        let ticks = cpu.run_until_halt(1000).unwrap();
        assert!(ticks < 1000);
        assert!(cpu.halted().unwrap());
        assert_eq!(cpu.output(), v(56));
        assert_eq!(cpu.ram.borrow().content()[13], v(56));
    }

    #[test]
    fn test_reset_button_clears_registers() {
        let mut cpu = BenEater::with_demo().unwrap();
        cpu.init().unwrap();
        cpu.board.tick_clock(12).unwrap();
        assert_ne!(cpu.pc.borrow().value(), &v(0));

        cpu.board.push_button("reset").unwrap();
        assert_eq!(cpu.pc.borrow().value(), &v(0));
        assert_eq!(cpu.step.borrow().value(), &v(0));
        assert_eq!(cpu.a.borrow().value(), &v(0));
    }
}

#[cfg(test)]
mod board_tests {
    use super::*;

    #[test]
    fn test_adder_board_probes() {
        let mut board = adder_board(4).unwrap();
        board.init().unwrap();
        board.set_switch("X", 0b0111u32).unwrap();
        board.set_switch("Y", 0b0001u32).unwrap();
        let readings = board.readings();
        assert_eq!(
            readings,
            vec![
                ("S".to_string(), "1000".to_string()),
                ("C".to_string(), "0".to_string())
            ]
        );
        assert_eq!(
            board.push_button("X"),
            Err(SimError::WrongControl {
                name: "X".to_string(),
                expected: "button"
            })
        );
    }

    #[test]
    fn test_lcd_demo() {
        let mut board = lcd_board().unwrap();
        board.init().unwrap();
        board.tick_clock(20).unwrap();
        assert_eq!(board.probe("PC").unwrap().render(), "15");
        assert_eq!(
            board.probe("LCD").unwrap().reading(),
            ProbeReading::Text(vec!["HI      ".to_string(), "!       ".to_string()])
        );
    }

    #[test]
    fn test_lcd_program_errors_surface() {
        let mut program = vec![0u32; 16];
        // 5x8 font selection
        program[1] = 0x030;
        let mut board = lcd_board_with(program).unwrap();
        board.init().unwrap();
        assert!(matches!(
            board.tick_clock(1),
            Err(SimError::Unsupported { .. })
        ));
    }
}
